use derive_more::{Display, From};
use serde::Serialize;

use crate::domain::market_data::CanonicalField;

/// Problems with raw input. Offending records are dropped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DataError {
    #[display(fmt = "input is not a list of records")]
    NotAList,
    #[display(fmt = "record is not an object")]
    NotAnObject,
    #[display(fmt = "missing numeric field `{}`", _0)]
    MissingField(CanonicalField),
    #[display(fmt = "high/low do not bracket open and close")]
    InvalidOhlc,
    #[display(fmt = "negative volume")]
    NegativeVolume,
}

/// Degenerate numeric domain, replaced by an epsilon domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(tag = "kind", content = "axis", rename_all = "camelCase")]
pub enum DomainError {
    #[display(fmt = "{} domain has zero range", _0)]
    ZeroRange(DomainAxis),
    #[display(fmt = "{} domain is inverted", _0)]
    InvertedRange(DomainAxis),
    #[display(fmt = "{} domain is not finite", _0)]
    NonFinite(DomainAxis),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainAxis {
    #[display(fmt = "price")]
    Price,
    #[display(fmt = "volume")]
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum AnimationStateError {
    #[display(fmt = "clock went backwards: tick at {}ms before phase start at {}ms", now_ms, started_at_ms)]
    ClockWentBackwards { now_ms: f64, started_at_ms: f64 },
    #[display(fmt = "tick time {}ms is not finite", now_ms)]
    NonFiniteTime { now_ms: f64 },
}

#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum ChartError {
    #[display(fmt = "Data Error: {}", _0)]
    Data(DataError),
    #[display(fmt = "Domain Error: {}", _0)]
    Domain(DomainError),
    #[display(fmt = "Animation Error: {}", _0)]
    AnimationState(AnimationStateError),
    #[display(fmt = "Config Error: {}", _0)]
    #[from(ignore)]
    Config(String),
}

impl std::error::Error for DataError {}
impl std::error::Error for DomainError {}
impl std::error::Error for AnimationStateError {}
impl std::error::Error for ChartError {}

pub type ChartResult<T> = Result<T, ChartError>;
