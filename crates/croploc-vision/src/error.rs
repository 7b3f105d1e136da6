//! Vision client error types.

use thiserror::Error;

/// Result type for Vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur when talking to the Vision API.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VisionError {
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map an HTTP status into the error taxonomy.
    pub fn from_http_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Auth(message),
            429 => Self::RateLimited(0),
            500..=599 => Self::ServiceUnavailable(message),
            _ => Self::RequestFailed(message),
        }
    }

    /// Check if error is retryable (transient transport conditions only).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VisionError::Network(_) | VisionError::RateLimited(_) | VisionError::ServiceUnavailable(_)
        )
    }

    /// Retry-After hint in milliseconds, when the service provided one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            VisionError::RateLimited(ms) if *ms > 0 => Some(*ms),
            _ => None,
        }
    }

    /// HTTP status used for metrics labels.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            VisionError::Auth(_) => Some(401),
            VisionError::RateLimited(_) => Some(429),
            VisionError::ServiceUnavailable(_) => Some(503),
            VisionError::RequestFailed(_) => Some(500),
            _ => None,
        }
    }
}
