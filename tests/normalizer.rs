use breakout_chart_wasm::domain::errors::DataError;
use breakout_chart_wasm::domain::market_data::{
    CanonicalField, RawRecord, SchemaNormalizer, SmaField, normalize,
};
use insta::assert_debug_snapshot;
use quickcheck_macros::quickcheck;
use serde_json::{Value, json};

fn raw(value: Value) -> RawRecord {
    value.as_object().cloned().unwrap()
}

/// Build a record from `(key, value)` pairs in the given order
fn from_pairs(pairs: &[(&str, Value)]) -> RawRecord {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn mixed_spellings_map_to_canonical_fields() {
    let records = vec![
        raw(json!({"Open": 10, "HIGH": 12, "low": 9, "c": 11, "vol": 100, "20sma": 10.5})),
        raw(json!({"open_price": "11", "high_price": 13, "l": 10, "Close": 12.5, "Volume": 50, "MA_10": 11})),
    ];
    let normalized = normalize(&records);

    assert_eq!(normalized.report.dropped_count(), 0);
    let series = normalized.series;
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].ohlcv.high.value(), 12.0);
    assert_eq!(series[0].ohlcv.volume.value(), 100.0);
    assert_eq!(series[0].sma(SmaField::Sma20).map(|p| p.value()), Some(10.5));
    assert_eq!(series[1].ohlcv.open.value(), 11.0);
    assert_eq!(series[1].sma(SmaField::Sma10).map(|p| p.value()), Some(11.0));
    assert_eq!(series[1].sma(SmaField::Sma50), None);
}

#[test]
fn canonical_record_shape() {
    let record = raw(json!({"Open": 10, "h": "12.5", "LOW": 9, "close_price": 11, "Vol": 300, "ma_10": 10.5}));
    let canonical = SchemaNormalizer::default().canonicalize(&record).unwrap();
    assert_debug_snapshot!(canonical, @r###"
    OhlcvRecord {
        ohlcv: OHLCV {
            open: Price(
                10.0,
            ),
            high: Price(
                12.5,
            ),
            low: Price(
                9.0,
            ),
            close: Price(
                11.0,
            ),
            volume: Volume(
                300.0,
            ),
        },
        sma10: Some(
            Price(
                10.5,
            ),
        ),
        sma20: None,
        sma50: None,
    }
    "###);
}

#[test]
fn high_below_low_is_dropped_and_counted() {
    let records = vec![
        raw(json!({"open": 10, "high": 12, "low": 9, "close": 11, "volume": 1})),
        raw(json!({"open": 10, "high": 8, "low": 9, "close": 11, "volume": 1})),
        raw(json!({"open": 10, "high": 12, "low": 9, "close": 11, "volume": -1})),
        raw(json!({"open": 10, "high": 12, "low": 9, "volume": 1})),
    ];
    let normalized = normalize(&records);

    assert_eq!(normalized.series.len(), 1);
    assert_eq!(normalized.report.input_len, 4);
    assert_eq!(normalized.report.accepted_count(), 1);
    let reasons: Vec<_> = normalized.report.dropped.iter().map(|d| (d.position, d.reason.clone())).collect();
    assert_eq!(
        reasons,
        vec![
            (1, DataError::InvalidOhlc),
            (2, DataError::NegativeVolume),
            (3, DataError::MissingField(CanonicalField::Close)),
        ]
    );
}

#[test]
fn non_list_input_is_rejected_as_a_whole() {
    let normalized = SchemaNormalizer::default().normalize_value(&json!({"open": 1}));
    assert!(normalized.series.is_empty());
    assert_eq!(normalized.report.rejected_input, Some(DataError::NotAList));
}

#[test]
fn non_object_items_are_dropped() {
    let value = json!([1, {"open": 1, "high": 1, "low": 1, "close": 1, "volume": 0}, "x"]);
    let normalized = SchemaNormalizer::default().normalize_value(&value);
    assert_eq!(normalized.series.len(), 1);
    assert_eq!(normalized.report.dropped_count(), 2);
    assert!(normalized.report.dropped.iter().all(|d| d.reason == DataError::NotAnObject));
}

#[test]
fn ema_spellings_need_opt_in() {
    let record = raw(json!({"open": 1, "high": 1, "low": 1, "close": 1, "volume": 0, "ema20": 1.0}));

    let strict = SchemaNormalizer::new(false).canonicalize(&record).unwrap();
    assert_eq!(strict.sma(SmaField::Sma20), None);

    let lenient = SchemaNormalizer::new(true).canonicalize(&record).unwrap();
    assert_eq!(lenient.sma(SmaField::Sma20).map(|p| p.value()), Some(1.0));
}

#[test]
fn non_finite_numbers_count_as_missing() {
    let record = raw(json!({"open": "NaN", "high": 1, "low": 1, "close": 1, "volume": 0}));
    assert_eq!(
        SchemaNormalizer::default().canonicalize(&record),
        Err(DataError::MissingField(CanonicalField::Open))
    );
}

#[quickcheck]
fn key_order_never_changes_the_result(open: u8, spread: u8, rotate: usize) -> bool {
    let open = open as f64;
    let pairs = [
        ("Open", json!(open)),
        ("open_price", json!(open + 1.0)),
        ("High", json!(open + spread as f64 + 1.0)),
        ("h", json!(open + 500.0)),
        ("LOW", json!(open - 1.0)),
        ("Low", json!(open - 2.0)),
        ("close", json!(open)),
        ("volume", json!(spread)),
        ("ma10", json!(open)),
    ];
    let mut rotated = pairs.to_vec();
    rotated.rotate_left(rotate % pairs.len());
    rotated.reverse();

    let normalizer = SchemaNormalizer::default();
    normalizer.canonicalize(&from_pairs(&pairs)) == normalizer.canonicalize(&from_pairs(&rotated))
}
