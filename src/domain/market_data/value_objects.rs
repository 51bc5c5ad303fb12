use derive_more::{Constructor, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

/// Value Object - price
#[derive(Debug, Clone, Copy, PartialEq, From, Into, Deref, Constructor, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

/// Value Object - traded volume
#[derive(Debug, Clone, Copy, PartialEq, From, Into, Deref, Constructor, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f64);

impl Volume {
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Value Object - OHLCV prices of one bar
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct OHLCV {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
}

impl OHLCV {
    /// High and low bracket the body, volume is non-negative
    pub fn is_valid(&self) -> bool {
        self.high >= self.open
            && self.high >= self.close
            && self.high >= self.low
            && self.low <= self.open
            && self.low <= self.close
            && self.volume.value() >= 0.0
    }
}

/// Moving-average slots carried by a canonical record
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum SmaField {
    #[strum(serialize = "sma10")]
    #[serde(rename = "sma10")]
    Sma10,
    #[strum(serialize = "sma20")]
    #[serde(rename = "sma20")]
    Sma20,
    #[strum(serialize = "sma50")]
    #[serde(rename = "sma50")]
    Sma50,
}

impl SmaField {
    pub fn period(&self) -> usize {
        match self {
            Self::Sma10 => 10,
            Self::Sma20 => 20,
            Self::Sma50 => 50,
        }
    }

    pub fn for_period(period: usize) -> Option<Self> {
        match period {
            10 => Some(Self::Sma10),
            20 => Some(Self::Sma20),
            50 => Some(Self::Sma50),
            _ => None,
        }
    }
}

/// Every field of the canonical record, in canonical order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum CanonicalField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Sma10,
    Sma20,
    Sma50,
}

impl CanonicalField {
    pub const REQUIRED: [CanonicalField; 5] =
        [Self::Open, Self::High, Self::Low, Self::Close, Self::Volume];

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    pub fn sma(&self) -> Option<SmaField> {
        match self {
            Self::Sma10 => Some(SmaField::Sma10),
            Self::Sma20 => Some(SmaField::Sma20),
            Self::Sma50 => Some(SmaField::Sma50),
            _ => None,
        }
    }
}

impl From<SmaField> for CanonicalField {
    fn from(field: SmaField) -> Self {
        match field {
            SmaField::Sma10 => Self::Sma10,
            SmaField::Sma20 => Self::Sma20,
            SmaField::Sma50 => Self::Sma50,
        }
    }
}

/// Which half of the round a series belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    #[display(fmt = "before")]
    Before,
    #[display(fmt = "after")]
    After,
}
