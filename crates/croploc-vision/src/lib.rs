//! Google Cloud Vision object-localization client.
//!
//! Production-grade client with:
//! - Service-account credential loading (inline secret or file path)
//! - Token caching with refresh margin and single-flight refresh
//! - HTTP client tuning (pooling, timeouts)
//! - Optional bounded retry with exponential backoff (off by default to
//!   keep the single-request submission semantics)
//! - Observability (tracing spans, metrics)

pub mod client;
pub mod credentials;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod token_cache;
pub mod types;

pub use client::{VisionClient, VisionConfig};
pub use credentials::{
    credentials_from_json, load_default_credentials, AccessToken, AccessTokenProvider,
    CredentialError,
};
pub use error::{VisionError, VisionResult};
pub use retry::RetryConfig;
pub use token_cache::{TokenCache, VISION_SCOPE};
