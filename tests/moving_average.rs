use breakout_chart_wasm::domain::market_data::{
    OHLCV, OhlcvRecord, Price, Series, SmaField, Volume, fill_missing_sma, sma_values, with_sma,
};
use quickcheck_macros::quickcheck;

fn bar(close: f64) -> OhlcvRecord {
    OhlcvRecord::new(OHLCV::new(
        Price::from(close),
        Price::from(close + 1.0),
        Price::from(close - 1.0),
        Price::from(close),
        Volume::from(1.0),
    ))
}

fn series(closes: &[f64]) -> Series {
    closes.iter().copied().map(bar).collect()
}

fn sma_of(series: &Series, field: SmaField) -> Vec<Option<f64>> {
    series.iter().map(|r| r.sma(field).map(|p| p.value())).collect()
}

#[test]
fn three_period_sma_matches_hand_computation() {
    let closes = [10.0, 11.0, 12.0, 11.0, 10.0].map(Some);
    let sma = sma_values(&closes, 3);

    assert_eq!(sma[0], None);
    assert_eq!(sma[1], None);
    assert_eq!(sma[2], Some(11.0));
    assert!((sma[3].unwrap() - 34.0 / 3.0).abs() < 1e-12);
    assert_eq!(sma[4], Some(11.0));
}

#[test]
fn window_tolerates_twenty_percent_missing() {
    let mut closes = vec![Some(5.0); 10];
    closes[3] = None;
    closes[7] = None;
    assert_eq!(sma_values(&closes, 10)[9], Some(5.0));

    closes[8] = None;
    assert_eq!(sma_values(&closes, 10)[9], None);
}

#[test]
fn short_series_gets_no_average() {
    let sma = sma_values(&[Some(1.0), Some(2.0)], 10);
    assert_eq!(sma, vec![None, None]);
}

#[quickcheck]
fn constant_series_average_is_exact(value: i32, len: u8) -> bool {
    let value = value as f64 / 10.0;
    let len = len as usize % 80 + 1;
    let closes = vec![Some(value); len];
    sma_values(&closes, 10)
        .iter()
        .enumerate()
        .all(|(i, sma)| if i >= 9 { *sma == Some(value) } else { sma.is_none() })
}

#[test]
fn with_sma_is_idempotent() {
    let base = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
    let once = with_sma(&base, 10, SmaField::Sma10);
    let twice = with_sma(&once, 10, SmaField::Sma10);

    assert_eq!(once, twice);
    assert_eq!(sma_of(&once, SmaField::Sma10)[9], Some(5.5));
    assert_eq!(sma_of(&once, SmaField::Sma20), vec![None; 11]);
}

#[test]
fn after_averages_continue_from_before_closes() {
    let before = series(&[1.0; 8]);
    let after = series(&[3.0; 4]);
    let (before, after) = fill_missing_sma(&before, Some(&after), 10, SmaField::Sma10);
    let after = after.unwrap();

    assert!(sma_of(&before, SmaField::Sma10).iter().all(Option::is_none));
    // Indices 9 and 10 of the combined series
    let after_sma = sma_of(&after, SmaField::Sma10);
    assert_eq!(after_sma[0], None);
    assert!((after_sma[1].unwrap() - 1.4).abs() < 1e-12);
    assert!((after_sma[2].unwrap() - 1.6).abs() < 1e-12);
}

#[test]
fn source_supplied_averages_are_kept() {
    let mut records: Vec<OhlcvRecord> = (0..12).map(|i| bar(i as f64)).collect();
    *records[11].sma_mut(SmaField::Sma10) = Some(Price::from(-1.0));
    let before = Series::new(records);

    let (filled, _) = fill_missing_sma(&before, None, 10, SmaField::Sma10);
    let sma = sma_of(&filled, SmaField::Sma10);
    assert_eq!(sma[9], Some(4.5));
    assert_eq!(sma[10], Some(5.5));
    assert_eq!(sma[11], Some(-1.0));
}
