//! Traditional Dunhuang mural pigments
//!
//! Uses OKLab distance to find the historical pigment closest to an
//! extracted color.

use async_trait::async_trait;

use crate::color::{Oklab, Rgb};
use crate::error::AppError;
use crate::naming::{NamedColor, NamingService};
use crate::palette::ColorName;

/// A pigment from the Mogao cave murals
#[derive(Debug, Clone, Copy)]
pub struct Pigment {
    pub rgb: Rgb,
    pub name: &'static str,
    pub en_name: &'static str,
    pub pinyin: &'static str,
    pub description: &'static str,
}

impl Pigment {
    pub fn to_named_color(&self, hex: String) -> NamedColor {
        NamedColor {
            hex,
            name: ColorName {
                name: self.name.to_string(),
                en_name: self.en_name.to_string(),
                pinyin: Some(self.pinyin.to_string()),
                description: Some(self.description.to_string()),
            },
        }
    }
}

pub static PIGMENTS: [Pigment; 10] = [
    Pigment {
        rgb: Rgb::new(0xA8, 0x4C, 0x32),
        name: "朱砂",
        en_name: "Cinnabar",
        pinyin: "zhūshā",
        description: "Ground from natural cinnabar ore. Keeps its hue for a thousand years and is the core red of Dunhuang.",
    },
    Pigment {
        rgb: Rgb::new(0x4B, 0x5E, 0x52),
        name: "石绿",
        en_name: "Malachite",
        pinyin: "shílǜ",
        description: "Milled from malachite, a deep and lively blue-green.",
    },
    Pigment {
        rgb: Rgb::new(0x2E, 0x4E, 0x7E),
        name: "石青",
        en_name: "Azurite",
        pinyin: "shíqīng",
        description: "Made from azurite, often used for the Buddha's hair or a deep sky.",
    },
    Pigment {
        rgb: Rgb::new(0xD8, 0xC2, 0x9D),
        name: "土黄",
        en_name: "Ochre Yellow",
        pinyin: "tǔhuáng",
        description: "The loess around the Mogao caves. The ground color of the earth and the most common background.",
    },
    Pigment {
        rgb: Rgb::new(0x8C, 0x7B, 0x6C),
        name: "赭石",
        en_name: "Red Ochre",
        pinyin: "zhěshí",
        description: "An iron-bearing mineral, plain and steady, used to outline rocks and mountains.",
    },
    Pigment {
        rgb: Rgb::new(0x3E, 0x38, 0x32),
        name: "墨黑",
        en_name: "Ink Black",
        pinyin: "mòhēi",
        description: "Traditional soot ink for contour lines and finishing touches, the bones of the composition.",
    },
    Pigment {
        rgb: Rgb::new(0xF2, 0xE8, 0xD5),
        name: "蛤白",
        en_name: "Clam White",
        pinyin: "gébái",
        description: "A fine, warm white ground from shells, used for highlights and reserved space.",
    },
    Pigment {
        rgb: Rgb::new(0xE5, 0xD5, 0xC0),
        name: "铅丹",
        en_name: "Minium",
        pinyin: "qiāndān",
        description: "A bright orange-red that oxidizes to dark brown or black over time, a trace of the years.",
    },
    Pigment {
        rgb: Rgb::new(0x9D, 0x29, 0x33),
        name: "胭脂",
        en_name: "Rouge",
        pinyin: "yānzhī",
        description: "A delicate plant-derived red, mostly used to shade the faces of court ladies.",
    },
    Pigment {
        rgb: Rgb::new(0xE9, 0xA3, 0x4C),
        name: "雄黄",
        en_name: "Realgar",
        pinyin: "xiónghuáng",
        description: "A clear orange-yellow that brings a warm, sunlit brightness to the murals.",
    },
];

/// Pigment matcher using OKLab perceptual distance
pub struct PigmentCatalog {
    /// Precomputed OKLab values, parallel to `PIGMENTS`
    oklab: Vec<Oklab>,
}

impl PigmentCatalog {
    pub fn new() -> Self {
        Self {
            oklab: PIGMENTS.iter().map(|p| p.rgb.to_oklab()).collect(),
        }
    }

    /// Closest pigment to `rgb`
    pub fn nearest(&self, rgb: Rgb) -> &'static Pigment {
        let target = rgb.to_oklab();
        let mut best_index = 0;
        let mut best_dist = f32::MAX;

        for (i, p) in self.oklab.iter().enumerate() {
            let dist = target.distance_squared(p);
            if dist < best_dist {
                best_dist = dist;
                best_index = i;
            }
        }

        &PIGMENTS[best_index]
    }
}

impl Default for PigmentCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NamingService for PigmentCatalog {
    fn source(&self) -> &'static str {
        "pigment-catalog"
    }

    async fn name_colors(&self, hexes: &[String]) -> Result<Vec<NamedColor>, AppError> {
        Ok(hexes
            .iter()
            .filter_map(|hex| {
                let rgb = Rgb::from_hex(hex)?;
                Some(self.nearest(rgb).to_named_color(hex.clone()))
            })
            .collect())
    }
}
