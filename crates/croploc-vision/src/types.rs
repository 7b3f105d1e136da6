//! Vision API request/response wire types.
//!
//! The service omits zero-valued and empty fields from its JSON, so every
//! response field carries a serde default.

use croploc_models::{DetectedObject, NormalizedVertex};
use serde::{Deserialize, Serialize};

/// Feature type requested for every submission.
pub const OBJECT_LOCALIZATION: &str = "OBJECT_LOCALIZATION";

/// Batch envelope for `images:annotate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAnnotateImagesRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

impl BatchAnnotateImagesRequest {
    /// A single-image object-localization request.
    pub fn object_localization(content_base64: String, max_results: u32) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: content_base64,
                },
                features: vec![Feature {
                    feature_type: OBJECT_LOCALIZATION.to_string(),
                    max_results: Some(max_results),
                }],
            }],
        }
    }
}

/// One image annotation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateImageRequest {
    pub image: ImageContent,
    pub features: Vec<Feature>,
}

/// Inline image payload (base64-encoded bytes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageContent {
    pub content: String,
}

/// Requested annotation feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

/// Batch envelope of responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchAnnotateImagesResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

/// One image annotation response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
}

/// Service-reported error for one request in the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// One localized object entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedObjectAnnotation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_poly: Option<BoundingPoly>,
}

/// Bounding polygon with normalized vertices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    #[serde(default)]
    pub normalized_vertices: Vec<WireVertex>,
}

/// A normalized vertex; the service omits zero coordinates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WireVertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl From<LocalizedObjectAnnotation> for DetectedObject {
    fn from(annotation: LocalizedObjectAnnotation) -> Self {
        let bounding_poly = annotation
            .bounding_poly
            .map(|poly| {
                poly.normalized_vertices
                    .into_iter()
                    .map(|v| NormalizedVertex::new(v.x, v.y))
                    .collect()
            })
            .unwrap_or_default();

        DetectedObject {
            name: annotation.name,
            score: annotation.score,
            bounding_poly,
        }
    }
}
