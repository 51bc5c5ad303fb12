use super::entities::Series;
use super::value_objects::{Price, SmaField};

/// Minimum valid closes required in a window of `period`: 80%, rounded up
pub fn required_coverage(period: usize) -> usize {
    (period * 4).div_ceil(5)
}

/// Trailing simple moving average with partial-coverage tolerance.
///
/// `None` entries and non-finite values in `closes` do not count toward the window.
/// Index `i` gets a value once `i >= period - 1` and the window holds at least
/// [`required_coverage`] valid closes; the value is their plain mean.
pub fn sma_values(closes: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }
    let needed = required_coverage(period);

    (0..closes.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let mut window =
                closes[i + 1 - period..=i].iter().flatten().copied().filter(|c| c.is_finite());
            // Deviations from the first close keep a flat window exact
            let base = window.next()?;
            let (deviation, valid) =
                window.fold((0.0, 1usize), |(sum, n), c| (sum + (c - base), n + 1));
            (valid >= needed).then(|| base + deviation / valid as f64)
        })
        .collect()
}

/// Returns a copy of `series` whose `field` holds the `period` SMA of closes.
///
/// Only `field` is touched, so running it again gives the same series.
pub fn with_sma(series: &Series, period: usize, field: SmaField) -> Series {
    let closes: Vec<Option<f64>> = series.closes().map(Some).collect();
    let averages = sma_values(&closes, period);
    series.map_records(|i, record| *record.sma_mut(field) = averages[i].map(Price::from))
}

/// Fill `field` where the source left it empty, computing over `before ++ after`.
///
/// Averages of the after segment keep using the trailing before closes. Values the
/// source supplied are kept as they are.
pub fn fill_missing_sma(
    before: &Series,
    after: Option<&Series>,
    period: usize,
    field: SmaField,
) -> (Series, Option<Series>) {
    let closes: Vec<Option<f64>> =
        before.closes().chain(after.into_iter().flat_map(|s| s.closes())).map(Some).collect();
    let averages = sma_values(&closes, period);

    let before_filled = fill_gaps(before, &averages, 0, field);
    let after_filled = after.map(|s| fill_gaps(s, &averages, before.len(), field));
    (before_filled, after_filled)
}

fn fill_gaps(series: &Series, averages: &[Option<f64>], offset: usize, field: SmaField) -> Series {
    series.map_records(|i, record| {
        let slot = record.sma_mut(field);
        if slot.is_none() {
            *slot = averages[offset + i].map(Price::from);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_threshold_rounds_up() {
        assert_eq!(required_coverage(10), 8);
        assert_eq!(required_coverage(3), 3);
        assert_eq!(required_coverage(20), 16);
        assert_eq!(required_coverage(50), 40);
    }

    #[test]
    fn zero_period_yields_nothing() {
        assert_eq!(sma_values(&[Some(1.0), Some(2.0)], 0), vec![None, None]);
    }
}
