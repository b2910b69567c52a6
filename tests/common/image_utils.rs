//! Image inspection utilities for testing.
//!
//! This module provides helper functions for decoding rendered figures and checking
//! their pixels.

use image::{DynamicImage, GenericImageView, ImageError, ImageFormat, Rgba};

/// Default per-channel tolerance for color checks
pub const DEFAULT_COLOR_TOLERANCE: u8 = 8;

/// Load an image from a byte array
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes)
}

/// Detect image format from bytes
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Whether a pixel is within `tolerance` of an RGB color on every channel
pub fn color_matches(pixel: Rgba<u8>, rgb: [u8; 3], tolerance: u8) -> bool {
    pixel.0[..3]
        .iter()
        .zip(rgb.iter())
        .all(|(a, e)| (*a as i16 - *e as i16).unsigned_abs() <= tolerance as u16)
}

/// Look for a pixel of the given color in a square window around `(cx, cy)`
///
/// # Returns
///
/// * `Some((x, y))` of the first matching pixel, scanning row by row
/// * `None` if no pixel in the window matches
pub fn find_color_near(
    image: &DynamicImage,
    cx: u32,
    cy: u32,
    radius: u32,
    rgb: [u8; 3],
    tolerance: Option<u8>,
) -> Option<(u32, u32)> {
    let tolerance = tolerance.unwrap_or(DEFAULT_COLOR_TOLERANCE);
    let (width, height) = image.dimensions();
    let y_range = cy.saturating_sub(radius)..=(cy + radius).min(height - 1);
    for y in y_range {
        for x in cx.saturating_sub(radius)..=(cx + radius).min(width - 1) {
            if color_matches(image.get_pixel(x, y), rgb, tolerance) {
                return Some((x, y));
            }
        }
    }
    None
}

/// Count the pixels of a given color in the whole image
pub fn count_color(image: &DynamicImage, rgb: [u8; 3], tolerance: Option<u8>) -> usize {
    let tolerance = tolerance.unwrap_or(DEFAULT_COLOR_TOLERANCE);
    image
        .pixels()
        .filter(|(_, _, p)| color_matches(*p, rgb, tolerance))
        .count()
}

/// Check if an image has the expected dimensions
///
/// # Returns
///
/// * `Ok(())` if the image has the expected dimensions
/// * `Err(String)` with an error message if the dimensions differ
pub fn assert_image_dimensions(
    image: &DynamicImage,
    expected_width: u32,
    expected_height: u32,
) -> Result<(), String> {
    let (actual_width, actual_height) = image.dimensions();

    if actual_width != expected_width || actual_height != expected_height {
        return Err(format!(
            "Image dimensions differ: actual = {}x{}, expected = {}x{}",
            actual_width, actual_height, expected_width, expected_height
        ));
    }

    Ok(())
}

/// Check if an image has the expected format
pub fn assert_image_format(bytes: &[u8], expected_format: ImageFormat) -> Result<(), String> {
    let actual_format =
        detect_image_format(bytes).ok_or_else(|| "Could not detect image format".to_string())?;

    if actual_format != expected_format {
        return Err(format!(
            "Image format differs: actual = {:?}, expected = {:?}",
            actual_format, expected_format
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    #[test]
    fn test_detect_image_format() {
        let img = ImageBuffer::<Rgba<u8>, Vec<u8>>::new(2, 2);
        let mut png_bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
            .unwrap();

        assert_eq!(detect_image_format(&png_bytes).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_find_color_near() {
        let mut img = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_pixel(9, 9, Rgba([255, 255, 255, 255]));
        img.put_pixel(6, 5, Rgba([250, 2, 3, 255]));
        let img = DynamicImage::ImageRgba8(img);

        assert_eq!(find_color_near(&img, 4, 4, 2, [255, 0, 0], None), Some((6, 5)));
        assert_eq!(find_color_near(&img, 1, 1, 2, [255, 0, 0], None), None);
        assert_eq!(count_color(&img, [255, 255, 255], Some(0)), 80);
    }
}
