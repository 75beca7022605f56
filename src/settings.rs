//! Extraction settings

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

pub const MIN_COLOR_COUNT: usize = 3;
pub const MAX_COLOR_COUNT: usize = 12;
pub const MIN_SAMPLE_PRECISION: u8 = 1;
pub const MAX_SAMPLE_PRECISION: u8 = 10;

/// Settings for one palette extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingSettings {
    /// Number of colors to extract (3-12)
    pub color_count: usize,
    /// Sampling density: 1 visits every 10th pixel, 10 visits every pixel
    pub sample_precision: u8,
    /// Apply the PCCS restoration transform to the extracted colors
    pub brighten: bool,
    /// Skip near-neutral pixels so the palette reflects pigment, not ground
    pub ignore_grayscale: bool,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            color_count: 6,
            sample_precision: 5,
            brighten: false,
            ignore_grayscale: true,
        }
    }
}

impl ProcessingSettings {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(MIN_COLOR_COUNT..=MAX_COLOR_COUNT).contains(&self.color_count) {
            return Err(AppError::InvalidSettings(format!(
                "colorCount must be between {} and {}, got {}",
                MIN_COLOR_COUNT, MAX_COLOR_COUNT, self.color_count
            )));
        }

        if !(MIN_SAMPLE_PRECISION..=MAX_SAMPLE_PRECISION).contains(&self.sample_precision) {
            return Err(AppError::InvalidSettings(format!(
                "samplePrecision must be between {} and {}, got {}",
                MIN_SAMPLE_PRECISION, MAX_SAMPLE_PRECISION, self.sample_precision
            )));
        }

        Ok(())
    }

    /// Pixel stride for the sampler
    pub fn sample_step(&self) -> usize {
        (11usize.saturating_sub(self.sample_precision as usize)).max(1)
    }
}
