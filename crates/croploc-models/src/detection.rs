//! Detection results returned by the remote object-localization service.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A vertex in coordinates normalized to [0, 1] of the submitted image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizedVertex {
    pub x: f64,
    pub y: f64,
}

impl NormalizedVertex {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single object localized by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectedObject {
    /// Human-readable label (e.g. "Cat")
    pub name: String,
    /// Confidence score in [0, 1]
    pub score: f64,
    /// Bounding polygon, four normalized vertices in service order
    /// (top-left, top-right, bottom-right, bottom-left) when present.
    #[serde(default)]
    pub bounding_poly: Vec<NormalizedVertex>,
}

impl DetectedObject {
    /// The diagonal corners of the bounding polygon (first and third vertex).
    ///
    /// Returns `None` when the polygon is missing or has fewer than three
    /// vertices, which callers must render as a soft per-entry fallback.
    pub fn diagonal(&self) -> Option<(NormalizedVertex, NormalizedVertex)> {
        if self.bounding_poly.len() < 3 {
            return None;
        }
        Some((self.bounding_poly[0], self.bounding_poly[2]))
    }
}

/// Normalized outcome of one detection request.
///
/// A non-empty `error` is authoritative: entries reported alongside it are
/// discarded at construction, so an error result never carries objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionResult {
    /// Detected objects in the order the service returned them
    pub objects: Vec<DetectedObject>,
    /// Error message reported by the service, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionResult {
    /// A successful result. An empty object list is a valid success.
    pub fn success(objects: Vec<DetectedObject>) -> Self {
        Self {
            objects,
            error: None,
        }
    }

    /// A result carrying a service-reported error. Error wins: any entries
    /// the service returned alongside it are dropped.
    pub fn from_remote_error(message: impl Into<String>) -> Self {
        Self {
            objects: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// True if the service flagged an error for this request.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
