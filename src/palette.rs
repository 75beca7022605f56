//! Palette assembly
//!
//! Turns clustered centroids into ordered [`ColorInfo`] records and wires the
//! sampler, clusterer and color transforms into one extraction call.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::color::{Cmyk, Rgb};
use crate::error::AppError;
use crate::kmeans::{self, Centroid, Seeding};
use crate::sampler;
use crate::settings::ProcessingSettings;

/// One extracted color
///
/// The name fields stay empty until a naming pass patches them in with
/// [`ColorInfo::with_name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorInfo {
    /// Uppercase `#RRGGBB`
    pub hex: String,
    pub rgb: Rgb,
    pub cmyk: Cmyk,
    /// Share of samples in this cluster, one decimal place
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinyin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Name fields delivered by a naming service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorName {
    pub name: String,
    pub en_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinyin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColorInfo {
    /// Encode a final cluster color, brightening first if requested
    pub fn from_centroid(color: Rgb, percentage: f64, brighten: bool) -> Self {
        let rgb = if brighten { color.brighten() } else { color };
        Self {
            hex: rgb.to_hex(),
            rgb,
            cmyk: rgb.to_cmyk(),
            percentage,
            name: None,
            en_name: None,
            pinyin: None,
            description: None,
        }
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// Apply a naming patch, leaving the computed fields untouched
    pub fn with_name(self, patch: ColorName) -> Self {
        Self {
            name: Some(patch.name),
            en_name: Some(patch.en_name),
            pinyin: patch.pinyin,
            description: patch.description,
            ..self
        }
    }
}

/// Round a share to one decimal place
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Build the ordered palette from clustered centroids
///
/// Zero-count centroids are kept with a 0.0 share so the output always has
/// one entry per centroid. Equal shares keep their centroid order.
pub fn assemble(centroids: &[Centroid], total_samples: usize, brighten: bool) -> Vec<ColorInfo> {
    let mut colors: Vec<ColorInfo> = centroids
        .iter()
        .map(|c| ColorInfo::from_centroid(c.color, percentage(c.count, total_samples), brighten))
        .collect();

    colors.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    colors
}

/// Run the full sample → cluster → assemble pipeline on an RGBA buffer
pub fn extract_palette(
    pixels: &[u8],
    width: u32,
    height: u32,
    settings: &ProcessingSettings,
    seeding: Seeding,
) -> Result<Vec<ColorInfo>, AppError> {
    settings.validate()?;

    let samples = sampler::sample(pixels, width, height, settings);
    tracing::debug!(
        "Sampled {} pixels from {}x{} (step {})",
        samples.len(),
        width,
        height,
        settings.sample_step()
    );

    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let result = kmeans::cluster(
        &samples,
        settings.color_count,
        kmeans::DEFAULT_MAX_ITERATIONS,
        seeding,
    );
    debug_assert_eq!(result.total_count(), samples.len());

    tracing::debug!(
        "Clustered {} samples into {} colors in {} iterations",
        samples.len(),
        result.centroids.len(),
        result.iterations
    );

    Ok(assemble(&result.centroids, samples.len(), settings.brighten))
}
