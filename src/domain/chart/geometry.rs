use serde::Serialize;

use super::scales::ScaleSet;
use crate::domain::market_data::{Series, SmaField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleDirection {
    Up,
    Down,
}

/// Drawable unit handed to the render adapter. Rebuilt every frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Primitive {
    #[serde(rename_all = "camelCase")]
    Candle {
        index: usize,
        x_px: f64,
        open_px: f64,
        close_px: f64,
        high_px: f64,
        low_px: f64,
        width: f64,
        direction: CandleDirection,
    },
    #[serde(rename_all = "camelCase")]
    VolumeBar { index: usize, x_px: f64, height_px: f64, width: f64 },
    /// One unbroken run of an average; gaps start a new polyline
    #[serde(rename_all = "camelCase")]
    AveragePolyline { period: usize, points: Vec<[f64; 2]> },
}

impl Primitive {
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Candle { index, .. } | Self::VolumeBar { index, .. } => Some(*index),
            Self::AveragePolyline { .. } => None,
        }
    }
}

/// Which segment is being drawn; the after segment starts at `start_index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Before,
    After { start_index: usize },
}

impl Segment {
    fn start_index(&self) -> usize {
        match self {
            Self::Before => 0,
            Self::After { start_index } => *start_index,
        }
    }
}

/// Number of after records visible at `reveal_fraction`
pub fn revealed_len(len: usize, reveal_fraction: f64) -> usize {
    if !reveal_fraction.is_finite() {
        return 0;
    }
    ((len as f64) * reveal_fraction.clamp(0.0, 1.0)).floor() as usize
}

/// Convert a segment into candles, volume bars and average polylines.
///
/// The before segment is always emitted whole. The after segment is cut to its first
/// [`revealed_len`] records. Records whose pixel positions are not finite are skipped.
pub fn to_primitives(
    series: &Series,
    scales: &ScaleSet,
    segment: Segment,
    reveal_fraction: f64,
    averages: &[SmaField],
) -> Vec<Primitive> {
    let visible = match segment {
        Segment::Before => series.len(),
        Segment::After { .. } => revealed_len(series.len(), reveal_fraction),
    };
    let records = &series.records()[..visible];
    let offset = segment.start_index();
    let width = scales.bar_width();

    let mut primitives = Vec::with_capacity(records.len() * 2 + averages.len());

    for (i, record) in records.iter().enumerate() {
        let index = offset + i;
        let x_px = scales.index_to_pixel(index as f64);
        let open_px = scales.price_to_pixel(record.ohlcv.open.value());
        let close_px = scales.price_to_pixel(record.ohlcv.close.value());
        let high_px = scales.price_to_pixel(record.ohlcv.high.value());
        let low_px = scales.price_to_pixel(record.ohlcv.low.value());
        let height_px = scales.volume_to_pixel(record.ohlcv.volume.value());

        let all_finite = [x_px, open_px, close_px, high_px, low_px, height_px, width]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            continue;
        }

        let direction =
            if record.is_bullish() { CandleDirection::Up } else { CandleDirection::Down };
        primitives.push(Primitive::Candle {
            index,
            x_px,
            open_px,
            close_px,
            high_px,
            low_px,
            width,
            direction,
        });
        primitives.push(Primitive::VolumeBar { index, x_px, height_px, width });
    }

    for field in averages {
        let mut run: Vec<[f64; 2]> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let point = record.sma(*field).map(|sma| {
                [scales.index_to_pixel((offset + i) as f64), scales.price_to_pixel(sma.value())]
            });
            match point {
                Some(p) if p.iter().all(|v| v.is_finite()) => run.push(p),
                _ => flush_run(&mut primitives, *field, &mut run),
            }
        }
        flush_run(&mut primitives, *field, &mut run);
    }

    primitives
}

fn flush_run(primitives: &mut Vec<Primitive>, field: SmaField, run: &mut Vec<[f64; 2]>) {
    if !run.is_empty() {
        primitives.push(Primitive::AveragePolyline {
            period: field.period(),
            points: std::mem::take(run),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::{ChartDomain, Dimensions};
    use crate::domain::market_data::{OHLCV, OhlcvRecord, Price, Volume};

    fn record(close: f64, sma10: Option<f64>) -> OhlcvRecord {
        let mut record = OhlcvRecord::new(OHLCV::new(
            Price::from(close),
            Price::from(close + 1.0),
            Price::from(close - 1.0),
            Price::from(close),
            Volume::from(5.0),
        ));
        *record.sma_mut(SmaField::Sma10) = sma10.map(Price::from);
        record
    }

    fn scales(width: f64) -> ScaleSet {
        let domain = ChartDomain {
            price_min: 0.0,
            price_max: 100.0,
            volume_max: 10.0,
            index_min: 0.0,
            index_max: 4.0,
        };
        ScaleSet::new(domain, Dimensions::new(width, 100.0))
    }

    fn polyline_lengths(primitives: &[Primitive]) -> Vec<usize> {
        primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::AveragePolyline { points, .. } => Some(points.len()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn revealed_len_floors_and_clamps() {
        assert_eq!(revealed_len(10, 0.0), 0);
        assert_eq!(revealed_len(10, 0.39), 3);
        assert_eq!(revealed_len(10, 1.0), 10);
        assert_eq!(revealed_len(10, 1.5), 10);
        assert_eq!(revealed_len(10, f64::NAN), 0);
    }

    #[test]
    fn average_gap_splits_the_polyline() {
        let series = Series::new(vec![
            record(50.0, Some(50.0)),
            record(51.0, Some(50.5)),
            record(52.0, None),
            record(53.0, Some(52.0)),
            record(54.0, Some(53.0)),
        ]);
        let primitives =
            to_primitives(&series, &scales(500.0), Segment::Before, 1.0, &[SmaField::Sma10]);
        assert_eq!(polyline_lengths(&primitives), vec![2, 2]);
    }

    #[test]
    fn non_finite_pixels_are_skipped() {
        let series = Series::new(vec![record(50.0, Some(50.0)), record(60.0, Some(55.0))]);
        let primitives =
            to_primitives(&series, &scales(f64::NAN), Segment::Before, 1.0, &[SmaField::Sma10]);
        assert!(primitives.is_empty());

        let mut spike = record(70.0, None);
        spike.ohlcv.high = Price::from(f64::INFINITY);
        let series = Series::new(vec![record(50.0, None), spike, record(60.0, None)]);
        let primitives = to_primitives(&series, &scales(500.0), Segment::Before, 1.0, &[]);
        let indices: Vec<_> = primitives.iter().filter_map(Primitive::index).collect();
        assert_eq!(indices, vec![0, 0, 2, 2]);
    }
}
