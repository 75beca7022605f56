//! Pixel sampling
//!
//! Walks a row-major RGBA buffer with a precision-derived stride and keeps
//! the opaque (and optionally chromatic) pixels as clustering samples.

use crate::color::Rgb;
use crate::settings::ProcessingSettings;

/// Pixels with alpha below this are treated as background
const MIN_ALPHA: u8 = 128;

/// Pixels whose channel spread is below this count as neutral
const GRAYSCALE_THRESHOLD: u8 = 20;

/// Collect samples from an RGBA buffer in scan order
///
/// Only the first `width * height` pixels of `pixels` are visited; a trailing
/// partial pixel is ignored.
pub fn sample(pixels: &[u8], width: u32, height: u32, settings: &ProcessingSettings) -> Vec<Rgb> {
    let pixel_count = width as usize * height as usize;
    let step = settings.sample_step();

    pixels
        .chunks_exact(4)
        .take(pixel_count)
        .step_by(step)
        .filter(|px| px[3] >= MIN_ALPHA)
        .map(|px| Rgb::new(px[0], px[1], px[2]))
        .filter(|rgb| !settings.ignore_grayscale || rgb.spread() >= GRAYSCALE_THRESHOLD)
        .collect()
}
