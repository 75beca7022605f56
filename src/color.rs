//! Color spaces used by the palette pipeline
//!
//! RGB is the working space for sampling and clustering. HSL backs the PCCS
//! brighten transform, CMYK and hex are output encodings, and OKLab is used
//! for perceptual matching against the pigment catalog.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared Euclidean distance in RGB space
    #[inline]
    pub fn distance_squared(&self, other: &Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Chroma spread used by the grayscale filter
    #[inline]
    pub fn spread(&self) -> u8 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        max - min
    }

    /// Uppercase `#RRGGBB`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse `#RRGGBB` or `RRGGBB`, case-insensitive
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_cmyk(&self) -> Cmyk {
        Cmyk::from_rgb(*self)
    }

    pub fn to_hsl(&self) -> Hsl {
        Hsl::from_rgb(*self)
    }

    pub fn to_oklab(&self) -> Oklab {
        Oklab::from_rgb(*self)
    }

    /// PCCS-style restoration: push saturation and lightness up, keep hue
    pub fn brighten(&self) -> Rgb {
        self.to_hsl().brighten().to_rgb()
    }
}

/// CMYK percentages, each in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Cmyk {
    pub c: u8,
    pub m: u8,
    pub y: u8,
    pub k: u8,
}

impl Cmyk {
    pub fn from_rgb(rgb: Rgb) -> Self {
        if rgb.r == 0 && rgb.g == 0 && rgb.b == 0 {
            return Self { c: 0, m: 0, y: 0, k: 100 };
        }

        let c = 1.0 - rgb.r as f64 / 255.0;
        let m = 1.0 - rgb.g as f64 / 255.0;
        let y = 1.0 - rgb.b as f64 / 255.0;
        let k = c.min(m).min(y);

        let percent = |v: f64| (v * 100.0).round().clamp(0.0, 100.0) as u8;
        let scale = 1.0 - k;

        Self {
            c: percent((c - k) / scale),
            m: percent((m - k) / scale),
            y: percent((y - k) / scale),
            k: percent(k),
        }
    }
}

/// Hue in degrees [0, 360), saturation and lightness in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// Saturation gain and lift applied by [`Hsl::brighten`]
const BRIGHTEN_SATURATION: (f64, f64) = (1.4, 0.1);
/// Lightness gain and lift applied by [`Hsl::brighten`]
const BRIGHTEN_LIGHTNESS: (f64, f64) = (1.1, 0.05);
/// Display-safe lightness ceiling after brightening
const BRIGHTEN_MAX_LIGHTNESS: f64 = 0.95;

impl Hsl {
    pub fn from_rgb(rgb: Rgb) -> Self {
        let r = rgb.r as f64 / 255.0;
        let g = rgb.g as f64 / 255.0;
        let b = rgb.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Self { h: 0.0, s: 0.0, l };
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };

        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Self { h: h * 60.0, s, l }
    }

    pub fn to_rgb(&self) -> Rgb {
        let to_byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;

        if self.s == 0.0 {
            let v = to_byte(self.l);
            return Rgb::new(v, v, v);
        }

        let q = if self.l < 0.5 {
            self.l * (1.0 + self.s)
        } else {
            self.l + self.s - self.l * self.s
        };
        let p = 2.0 * self.l - q;
        let h = self.h / 360.0;

        Rgb::new(
            to_byte(hue_to_channel(p, q, h + 1.0 / 3.0)),
            to_byte(hue_to_channel(p, q, h)),
            to_byte(hue_to_channel(p, q, h - 1.0 / 3.0)),
        )
    }

    /// Raise saturation and lightness, never past display-safe bounds
    pub fn brighten(&self) -> Hsl {
        let (s_gain, s_lift) = BRIGHTEN_SATURATION;
        let (l_gain, l_lift) = BRIGHTEN_LIGHTNESS;
        Hsl {
            h: self.h,
            s: (self.s * s_gain + s_lift).min(1.0),
            l: (self.l * l_gain + l_lift).min(BRIGHTEN_MAX_LIGHTNESS),
        }
    }
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// OKLab color for perceptual distance
#[derive(Debug, Clone, Copy)]
pub struct Oklab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Oklab {
    #[inline]
    fn linearize(c: u8) -> f32 {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    pub fn from_rgb(rgb: Rgb) -> Self {
        let (r, g, b) = (
            Self::linearize(rgb.r),
            Self::linearize(rgb.g),
            Self::linearize(rgb.b),
        );

        let l = (0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b).cbrt();
        let m = (0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b).cbrt();
        let s = (0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b).cbrt();

        Self {
            l: 0.2104542553 * l + 0.7936177850 * m - 0.0040720468 * s,
            a: 1.9779984951 * l - 2.4285922050 * m + 0.4505937099 * s,
            b: 0.0259040371 * l + 0.7827717662 * m - 0.8086757660 * s,
        }
    }

    #[inline]
    pub fn distance_squared(&self, other: &Oklab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }
}
