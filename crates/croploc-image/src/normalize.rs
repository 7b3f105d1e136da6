//! Crop-to-submission normalization.
//!
//! The detection endpoint accepts an opaque, lossy-compressed buffer. A crop
//! taken from a PNG may still carry an alpha channel; naive conversion to
//! JPEG would turn transparent regions black. Normalization composites such
//! crops onto a solid white background using alpha as the blend mask, then
//! encodes the opaque result as JPEG.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use tracing::debug;

use crate::error::{ImageError, ImageResult};

/// Quality used for the submission JPEG.
pub const JPEG_QUALITY: u8 = 90;

/// Flatten a bitmap's alpha channel onto a white background.
///
/// Bitmaps without alpha pass through unchanged (by copy). The input is
/// never mutated, and re-applying the flatten to an already-opaque bitmap
/// is a no-op.
pub fn flatten_alpha(image: &DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image.clone();
    }

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut flat = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as u32;
        let blend = |c: u8| -> u8 {
            ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        flat.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }

    DynamicImage::ImageRgb8(flat)
}

/// Normalize a crop into the byte buffer submitted to the detection service.
///
/// Pure and deterministic: flatten alpha (if any) onto white, then encode
/// the opaque bitmap as JPEG. The input bitmap is not mutated.
pub fn to_submission_jpeg(image: &DynamicImage) -> ImageResult<Vec<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageError::encode(format!(
            "cannot encode empty bitmap ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let opaque = flatten_alpha(image);

    let mut buf = Vec::new();
    opaque
        .write_to(
            &mut Cursor::new(&mut buf),
            ImageOutputFormat::Jpeg(JPEG_QUALITY),
        )
        .map_err(|e| ImageError::encode(e.to_string()))?;

    debug!(
        width = opaque.width(),
        height = opaque.height(),
        bytes = buf.len(),
        "Encoded submission JPEG"
    );

    Ok(buf)
}
