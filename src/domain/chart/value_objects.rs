use derive_more::Display;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

use crate::domain::market_data::SmaField;

/// Value Object - container size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides finite and strictly positive
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self { width: 800.0, height: 400.0 }
    }
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::new(r, g, b, 1.0)
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// `#rrggbb`, alpha dropped
    pub fn to_css(&self) -> String {
        format!("#{:06x}", self.to_hex())
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

/// Closed set of chart presentations used by the practice rounds
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChartVariant {
    #[default]
    #[display(fmt = "Default")]
    #[strum(serialize = "default")]
    Default,
    #[display(fmt = "Hourly")]
    #[strum(serialize = "hourly")]
    Hourly,
    #[display(fmt = "History")]
    #[strum(serialize = "history")]
    History,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantColors {
    pub bullish: Color,
    pub bearish: Color,
    pub volume: Color,
    pub sma10: Color,
    pub sma20: Color,
    pub sma50: Color,
}

impl VariantColors {
    pub fn average(&self, field: SmaField) -> Color {
        match field {
            SmaField::Sma10 => self.sma10,
            SmaField::Sma20 => self.sma20,
            SmaField::Sma50 => self.sma50,
        }
    }
}

/// Everything a variant decides: palette and which averages are drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantStyle {
    pub colors: VariantColors,
    pub visible_averages: Vec<SmaField>,
}

static VARIANT_STYLES: Lazy<HashMap<ChartVariant, VariantStyle>> =
    Lazy::new(|| ChartVariant::iter().map(|v| (v, v.build_style())).collect());

impl ChartVariant {
    /// Resolved once per process from the lookup table
    pub fn style(&self) -> &'static VariantStyle {
        &VARIANT_STYLES[self]
    }

    pub fn shows_average(&self, field: SmaField) -> bool {
        self.style().visible_averages.contains(&field)
    }

    fn build_style(self) -> VariantStyle {
        let base = VariantColors {
            bullish: Color::from_hex(0x26a69a),
            bearish: Color::from_hex(0xef5350),
            volume: Color::from_hex(0x5c6bc0).with_alpha(0.5),
            sma10: Color::from_hex(0x00bcd4),
            sma20: Color::from_hex(0xffb300),
            sma50: Color::from_hex(0xab47bc),
        };
        match self {
            Self::Default => VariantStyle {
                colors: base,
                visible_averages: vec![SmaField::Sma10, SmaField::Sma20, SmaField::Sma50],
            },
            Self::Hourly => VariantStyle {
                colors: VariantColors { volume: Color::from_hex(0x78909c).with_alpha(0.5), ..base },
                visible_averages: vec![SmaField::Sma10, SmaField::Sma20],
            },
            Self::History => VariantStyle {
                colors: VariantColors {
                    bullish: Color::from_hex(0x66bb6a),
                    bearish: Color::from_hex(0xe57373),
                    ..base
                },
                visible_averages: vec![SmaField::Sma20, SmaField::Sma50],
            },
        }
    }
}
