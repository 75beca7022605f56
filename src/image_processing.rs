//! Image decoding for palette extraction
//!
//! - Decode PNG/JPEG/WebP/GIF bytes
//! - Convert to RGBA8
//! - Downscale so the longest side fits the configured bound

use crate::error::AppError;
use image::imageops::FilterType;
use image::{GenericImageView, RgbaImage};

/// Decode image bytes into an RGBA buffer no larger than `max_dimension`
pub fn decode_rgba(image_data: &[u8], max_dimension: u32) -> Result<RgbaImage, AppError> {
    let img = image::load_from_memory(image_data)
        .map_err(|e| AppError::Decode(format!("Failed to decode image: {}", e)))?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(AppError::Decode("Image has no pixels".to_string()));
    }

    let rgba = img.to_rgba8();
    match bounded_dimensions(width, height, max_dimension) {
        Some((w, h)) => {
            tracing::debug!("Downscaling {}x{} to {}x{}", width, height, w, h);
            // Triangle is bilinear
            Ok(image::imageops::resize(&rgba, w, h, FilterType::Triangle))
        }
        None => Ok(rgba),
    }
}

/// Target size preserving aspect ratio, or `None` if already within bounds
fn bounded_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if max_dimension == 0 || longest <= max_dimension {
        return None;
    }

    let scale = max_dimension as f64 / longest as f64;
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_dimension);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_dimension);
    Some((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_bounded_dimensions() {
        assert_eq!(bounded_dimensions(100, 50, 256), None);
        assert_eq!(bounded_dimensions(1024, 512, 256), Some((256, 128)));
        assert_eq!(bounded_dimensions(300, 4000, 200), Some((15, 200)));
        assert_eq!(bounded_dimensions(5000, 2, 100), Some((100, 1)));
    }

    #[test]
    fn test_decode_small_png_untouched() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let decoded = decode_rgba(&encode_png(&img), 256).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_decode_downscales_large_png() {
        let img = RgbaImage::from_pixel(400, 100, Rgba([200, 0, 0, 255]));
        let decoded = decode_rgba(&encode_png(&img), 200).unwrap();
        assert_eq!(decoded.dimensions(), (200, 50));
        assert_eq!(decoded.get_pixel(100, 25), &Rgba([200, 0, 0, 255]));
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_rgba(b"not an image", 256).unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }
}
