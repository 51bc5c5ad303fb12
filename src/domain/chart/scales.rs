//! Numeric domains and pixel mappings for one frame.
//!
//! A [`ScaleSet`] is only meaningful for the `(ChartDomain, Dimensions)` pair it was
//! built from; every resize or animation step builds a fresh one.

use serde::Serialize;

use super::value_objects::Dimensions;
use crate::domain::animation::AnimationState;
use crate::domain::errors::{DomainAxis, DomainError};
use crate::domain::market_data::Series;

/// Narrowest span a domain may have before it is widened
pub const MIN_DOMAIN_SPAN: f64 = 1e-6;
/// Share of the container height used by volume bars
pub const VOLUME_PANE_RATIO: f64 = 0.2;
/// Headroom above the tallest volume bar
pub const VOLUME_HEADROOM: f64 = 1.1;
/// From this zoom factor on, the whole combined index range is shown
pub const FULL_INDEX_RANGE_ZOOM: f64 = 0.4;
/// Share of a slot left empty between neighbouring candles
pub const SPACING_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDomain {
    pub price_min: f64,
    pub price_max: f64,
    pub volume_max: f64,
    pub index_min: f64,
    pub index_max: f64,
}

impl ChartDomain {
    /// Number of index slots across the window, never below one
    pub fn index_slots(&self) -> f64 {
        (self.index_max - self.index_min + 1.0).max(1.0)
    }
}

/// Affine map from a numeric domain onto a pixel range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let t = (value - self.domain.0) / (self.domain.1 - self.domain.0);
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let t = (pixel - self.range.0) / (self.range.1 - self.range.0);
        self.domain.0 + t * (self.domain.1 - self.domain.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSet {
    pub domain: ChartDomain,
    pub dimensions: Dimensions,
    pub price: LinearScale,
    pub volume: LinearScale,
    pub index: LinearScale,
}

impl ScaleSet {
    pub fn new(domain: ChartDomain, dimensions: Dimensions) -> Self {
        let Dimensions { width, height } = dimensions;
        Self {
            domain,
            dimensions,
            price: LinearScale::new((domain.price_min, domain.price_max), (height, 0.0)),
            volume: LinearScale::new((0.0, domain.volume_max), (0.0, height * VOLUME_PANE_RATIO)),
            index: LinearScale::new(
                (domain.index_min - 0.5, domain.index_max + 0.5),
                (0.0, width),
            ),
        }
    }

    /// Y of a price, growing downwards
    pub fn price_to_pixel(&self, price: f64) -> f64 {
        self.price.map(price)
    }

    /// Height of a volume bar
    pub fn volume_to_pixel(&self, volume: f64) -> f64 {
        self.volume.map(volume)
    }

    /// X of the centre of an index slot
    pub fn index_to_pixel(&self, index: f64) -> f64 {
        self.index.map(index)
    }

    pub fn slot_width(&self) -> f64 {
        self.dimensions.width / self.domain.index_slots()
    }

    pub fn bar_width(&self) -> f64 {
        self.slot_width() * (1.0 - SPACING_RATIO)
    }

    pub fn is_valid_for(&self, domain: &ChartDomain, dimensions: &Dimensions) -> bool {
        self.domain == *domain && self.dimensions == *dimensions
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleComputation {
    pub scales: ScaleSet,
    /// Degenerate domains that were replaced by epsilon domains
    pub issues: Vec<DomainError>,
}

/// Build the scales for one frame from a single animation snapshot
pub fn compute_scales(
    before: &Series,
    after: Option<&Series>,
    state: &AnimationState,
    dimensions: Dimensions,
) -> ScaleComputation {
    let (domain, issues) = compute_domain(before, after, state.zoom_factor);
    ScaleComputation { scales: ScaleSet::new(domain, dimensions), issues }
}

pub fn compute_domain(
    before: &Series,
    after: Option<&Series>,
    zoom_factor: f64,
) -> (ChartDomain, Vec<DomainError>) {
    let zoom = if zoom_factor.is_finite() { zoom_factor.clamp(0.0, 1.0) } else { 0.0 };
    let after = after.filter(|s| !s.is_empty());
    let mut issues = Vec::new();

    let (price_min, price_max) = price_window(before, after, zoom);
    let (price_min, price_max) = ensure_span(price_min, price_max, DomainAxis::Price, &mut issues);

    let volume_peak = before
        .max_volume()
        .into_iter()
        .chain(after.and_then(|s| s.max_volume()))
        .fold(0.0, f64::max);
    let (_, volume_max) =
        ensure_span(0.0, volume_peak * VOLUME_HEADROOM, DomainAxis::Volume, &mut issues);

    let (index_min, index_max) =
        index_window(before.len(), after.map_or(0, |s| s.len()), zoom);

    let domain = ChartDomain { price_min, price_max, volume_max, index_min, index_max };
    (domain, issues)
}

/// Camera pull-back: interpolate from the before-only extrema toward a window
/// centred on the before midpoint that also holds the after segment.
fn price_window(before: &Series, after: Option<&Series>, zoom: f64) -> (f64, f64) {
    let before_extent = before.price_extent();
    let after_extent = after.and_then(|s| s.price_extent());

    let Some((b_min, b_max)) = before_extent.or(after_extent) else {
        return (0.0, 0.0);
    };

    let (lo, hi) = match after_extent {
        Some((a_min, a_max)) if before_extent.is_some() => {
            let (c_min, c_max) = (b_min.min(a_min), b_max.max(a_max));
            let mid = (b_max + b_min) / 2.0;
            let half = ((c_max - c_min) * (1.2 + 0.2 * zoom) / 2.0)
                .max(c_max - mid)
                .max(mid - c_min);
            let (full_min, full_max) = (mid - half, mid + half);
            (b_min + (full_min - b_min) * zoom, b_max + (full_max - b_max) * zoom)
        }
        _ => (b_min, b_max),
    };

    let padding = (hi - lo) * (0.05 + 0.05 * zoom);
    (lo - padding, hi + padding)
}

/// Visible index window. Every before index stays inside it at any zoom.
fn index_window(before_len: usize, after_len: usize, zoom: f64) -> (f64, f64) {
    let b = before_len as f64;
    let total = (before_len + after_len) as f64;
    if total == 0.0 {
        return (0.0, 0.0);
    }
    if after_len == 0 || zoom >= FULL_INDEX_RANGE_ZOOM {
        return (0.0, total - 1.0);
    }

    let width = b + (total - b) * (zoom * 1.2).min(1.0);
    let progress = zoom / FULL_INDEX_RANGE_ZOOM;
    let before_center = (b - 1.0).max(0.0) / 2.0;
    let full_center = (total - 1.0) / 2.0;
    let center = before_center + (full_center - before_center) * progress;

    let start = (center - (width - 1.0) / 2.0).clamp(b - width, 0.0);
    (start, start + width - 1.0)
}

fn ensure_span(
    min: f64,
    max: f64,
    axis: DomainAxis,
    issues: &mut Vec<DomainError>,
) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        issues.push(DomainError::NonFinite(axis));
        return (0.0, 1.0);
    }
    if max < min {
        issues.push(DomainError::InvertedRange(axis));
        return (max, min);
    }
    if max - min >= MIN_DOMAIN_SPAN {
        return (min, max);
    }

    issues.push(DomainError::ZeroRange(axis));
    if axis == DomainAxis::Volume {
        return (0.0, 1.0);
    }
    let center = (min + max) / 2.0;
    let half = (center.abs() * 0.01).max(MIN_DOMAIN_SPAN);
    (center - half, center + half)
}
