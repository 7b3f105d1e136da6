//! Shared data models for the CropLoc backend.
//!
//! This crate provides Serde-serializable types for:
//! - Crop selections and aspect-ratio constraints
//! - Detection results returned by the remote localization service
//! - The per-session interaction state machine

pub mod aspect;
pub mod detection;
pub mod selection;
pub mod session;

// Re-export common types
pub use aspect::{AspectConstraint, AspectRatio, AspectRatioParseError};
pub use detection::{DetectedObject, DetectionResult, NormalizedVertex};
pub use selection::CropSelection;
pub use session::{SessionEvent, SessionPhase, TransitionError};
