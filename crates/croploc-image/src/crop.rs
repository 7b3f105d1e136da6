//! Crop extraction.

use croploc_models::CropSelection;
use image::DynamicImage;

use crate::error::{ImageError, ImageResult};

/// Extract a crop selection from a source bitmap by copy.
///
/// The source is never mutated; the returned bitmap owns its pixels. The
/// selection must be non-empty and lie entirely within the source frame.
pub fn crop_selection(source: &DynamicImage, selection: CropSelection) -> ImageResult<DynamicImage> {
    if selection.is_empty() {
        return Err(ImageError::invalid_selection("selection has no area"));
    }
    if !selection.fits_within(source.width(), source.height()) {
        return Err(ImageError::invalid_selection(format!(
            "selection {}x{}+{}+{} exceeds {}x{} frame",
            selection.width,
            selection.height,
            selection.x,
            selection.y,
            source.width(),
            source.height()
        )));
    }

    Ok(source.crop_imm(selection.x, selection.y, selection.width, selection.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([x as u8, y as u8, 0])
        }))
    }

    #[test]
    fn test_crop_copies_region() {
        let source = gradient(10, 10);
        let crop = crop_selection(&source, CropSelection::new(2, 3, 4, 5)).unwrap();
        assert_eq!(crop.dimensions(), (4, 5));
        // Pixel (0,0) of the crop is pixel (2,3) of the source.
        assert_eq!(crop.get_pixel(0, 0), source.get_pixel(2, 3));
        assert_eq!(crop.get_pixel(3, 4), source.get_pixel(5, 7));
    }

    #[test]
    fn test_crop_does_not_mutate_source() {
        let source = gradient(8, 8);
        let before = source.clone();
        let _ = crop_selection(&source, CropSelection::new(1, 1, 4, 4)).unwrap();
        assert_eq!(source.to_rgb8().as_raw(), before.to_rgb8().as_raw());
    }

    #[test]
    fn test_full_frame_crop() {
        let source = gradient(6, 4);
        let crop = crop_selection(&source, CropSelection::full_frame(6, 4)).unwrap();
        assert_eq!(crop.dimensions(), (6, 4));
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        let source = gradient(10, 10);
        assert!(crop_selection(&source, CropSelection::new(8, 8, 4, 4)).is_err());
        assert!(crop_selection(&source, CropSelection::new(0, 0, 11, 1)).is_err());
    }

    #[test]
    fn test_rejects_empty_selection() {
        let source = gradient(10, 10);
        let err = crop_selection(&source, CropSelection::new(0, 0, 0, 5)).unwrap_err();
        assert!(matches!(err, ImageError::InvalidSelection(_)));
    }
}
