//! Upload decoding with format and dimension validation.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::error::{ImageError, ImageResult};

/// Maximum accepted upload size (20MB), checked before any parsing.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Maximum decoded pixel count (100 megapixels), checked before full decode.
pub const MAX_PIXELS: u64 = 100_000_000;

/// Formats the upload boundary accepts.
const ALLOWED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png];

/// A successfully decoded upload.
#[derive(Debug)]
pub struct DecodedUpload {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedUpload {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether the decoded bitmap carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }
}

/// Check a declared upload type (filename extension or MIME type) against
/// the accepted set {jpg, jpeg, png}.
pub fn is_supported_declared_type(declared: &str) -> bool {
    let declared = declared.trim().to_ascii_lowercase();
    matches!(
        declared.as_str(),
        "jpg" | "jpeg" | "png" | "image/jpeg" | "image/png"
    )
}

/// Decode an uploaded byte blob into a bitmap.
///
/// Validation layers, cheapest first: byte-size cap, format sniffing against
/// the allowlist, header-only dimension checks (zero-dimension and
/// decompression-bomb guards), then the full decode.
pub fn decode_upload(data: &[u8]) -> ImageResult<DecodedUpload> {
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ImageError::UploadTooLarge(data.len(), MAX_UPLOAD_BYTES));
    }

    let format = sniff_format(data)?;
    let (width, height) = validate_dimensions(data)?;

    let image = image::load_from_memory_with_format(data, format)
        .map_err(|e| ImageError::decode(e.to_string()))?;

    debug!(
        width,
        height,
        format = ?format,
        has_alpha = image.color().has_alpha(),
        "Decoded upload"
    );

    Ok(DecodedUpload { image, format })
}

/// Sniff the actual byte format and check it against the allowlist.
fn sniff_format(data: &[u8]) -> ImageResult<ImageFormat> {
    let format = image::guess_format(data).map_err(|e| ImageError::decode(e.to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::UnsupportedFormat(format!("{:?}", format)));
    }

    Ok(format)
}

/// Read dimensions from the header without decoding pixel data.
fn validate_dimensions(data: &[u8]) -> ImageResult<(u32, u32)> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode(e.to_string()))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ImageError::decode(e.to_string()))?;

    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }

    let pixel_count = (width as u64).saturating_mul(height as u64);
    if pixel_count > MAX_PIXELS {
        return Err(ImageError::PixelCountTooLarge {
            width,
            height,
            max_pixels: MAX_PIXELS,
        });
    }

    Ok((width, height))
}
