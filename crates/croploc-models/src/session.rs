//! Per-session interaction state machine.
//!
//! Replaces the implicit rerun-on-every-interaction control flow of the
//! original tool with explicit phases and transition triggers. Illegal
//! triggers are rejected with a typed error rather than ignored.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a session currently is in the upload -> crop -> detect flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No image uploaded yet
    #[default]
    AwaitingUpload,
    /// Image decoded, default selection installed, crop not yet confirmed
    AwaitingCrop,
    /// A valid crop selection is in place
    ReadyToDetect,
    /// A detection request is in flight
    Detecting,
    /// The last detection produced a rendered result
    ShowingResult,
    /// The last detection failed or the service reported an error
    ShowingError,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::AwaitingUpload => "awaiting_upload",
            SessionPhase::AwaitingCrop => "awaiting_crop",
            SessionPhase::ReadyToDetect => "ready_to_detect",
            SessionPhase::Detecting => "detecting",
            SessionPhase::ShowingResult => "showing_result",
            SessionPhase::ShowingError => "showing_error",
        }
    }

    /// True when a detect trigger is acceptable from this phase.
    pub fn can_detect(&self) -> bool {
        matches!(
            self,
            SessionPhase::ReadyToDetect | SessionPhase::ShowingResult | SessionPhase::ShowingError
        )
    }

    /// Apply a trigger, returning the next phase.
    pub fn transition(self, event: SessionEvent) -> Result<SessionPhase, TransitionError> {
        use SessionEvent::*;
        use SessionPhase::*;

        let next = match (self, event) {
            // A new upload replaces everything, from any phase except mid-flight.
            (Detecting, UploadReceived) => return Err(TransitionError::new(self, event)),
            (_, UploadReceived) => AwaitingCrop,

            (AwaitingCrop | ReadyToDetect | ShowingResult | ShowingError, CropChanged) => {
                ReadyToDetect
            }

            (phase, DetectPressed) if phase.can_detect() => Detecting,

            (Detecting, ResponseReceived) => ShowingResult,
            (Detecting, DetectionFailed) => ShowingError,

            (_, Reset) => AwaitingUpload,

            _ => return Err(TransitionError::new(self, event)),
        };
        Ok(next)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Triggers that move a session between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    UploadReceived,
    CropChanged,
    DetectPressed,
    ResponseReceived,
    DetectionFailed,
    Reset,
}

impl SessionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEvent::UploadReceived => "upload_received",
            SessionEvent::CropChanged => "crop_changed",
            SessionEvent::DetectPressed => "detect_pressed",
            SessionEvent::ResponseReceived => "response_received",
            SessionEvent::DetectionFailed => "detection_failed",
            SessionEvent::Reset => "reset",
        }
    }
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A trigger that is not legal from the session's current phase.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("event '{event}' is not valid in phase '{from}'")]
pub struct TransitionError {
    pub from: SessionPhase,
    pub event: SessionEvent,
}

impl TransitionError {
    fn new(from: SessionPhase, event: SessionEvent) -> Self {
        Self { from, event }
    }
}
