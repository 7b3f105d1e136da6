//! Image ingest, cropping and submission normalization.
//!
//! This crate owns all pixel work in the pipeline:
//! - Decoding uploaded byte blobs with format and dimension validation
//! - Extracting the user's crop selection by copy
//! - Normalizing a crop into the opaque JPEG buffer the detection service
//!   accepts (alpha is flattened onto white, never discarded)

pub mod crop;
pub mod error;
pub mod ingest;
pub mod normalize;

pub use crop::crop_selection;
pub use error::{ImageError, ImageResult};
pub use ingest::{decode_upload, is_supported_declared_type, DecodedUpload};
pub use normalize::{flatten_alpha, to_submission_jpeg, JPEG_QUALITY};
