//! Axum HTTP API server for the crop-and-detect tool.
//!
//! This crate provides:
//! - Session lifecycle endpoints (upload, crop, detect)
//! - Deterministic result rendering
//! - Security headers and CORS
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use render::{render, LineKind, RenderedReport, ReportLine};
pub use routes::create_router;
pub use session::{Session, SessionStore};
pub use state::AppState;
