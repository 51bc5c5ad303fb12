//! Schema normalization at the data boundary.
//!
//! Sources disagree on key names (`Open`/`open`/`OPEN`, `10sma`/`sma10`/`ma10`).
//! Every field is resolved once here through a fixed, ordered candidate list so that
//! nothing downstream ever looks at a raw key again.

use serde_json::Value;
use strum::IntoEnumIterator;

use super::entities::{OhlcvRecord, RawRecord, Series};
use super::value_objects::{CanonicalField, OHLCV, Price, Volume};
use crate::domain::errors::DataError;
use crate::domain::logging::LogComponent;
use crate::log_debug;

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRecord {
    /// Position in the raw input
    pub position: usize,
    pub reason: DataError,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizationReport {
    pub input_len: usize,
    pub dropped: Vec<DroppedRecord>,
    /// Set when the input was not a list at all
    pub rejected_input: Option<DataError>,
}

impl NormalizationReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn accepted_count(&self) -> usize {
        self.input_len - self.dropped.len()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedSeries {
    pub series: Series,
    pub report: NormalizationReport,
}

/// Ordered key candidates for one canonical field
#[derive(Debug, Clone)]
struct FieldCandidates {
    field: CanonicalField,
    names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SchemaNormalizer {
    table: Vec<FieldCandidates>,
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new(false)
    }
}

impl SchemaNormalizer {
    /// `accept_ema_as_sma` appends `ema{N}` spellings as the last SMA synonyms
    pub fn new(accept_ema_as_sma: bool) -> Self {
        let table = CanonicalField::iter()
            .map(|field| FieldCandidates { field, names: candidate_names(field, accept_ema_as_sma) })
            .collect();
        Self { table }
    }

    pub fn normalize(&self, raw: &[RawRecord]) -> NormalizedSeries {
        self.normalize_items(raw.iter().map(Some))
    }

    /// Accepts any JSON value; anything but an array of objects is filtered out
    pub fn normalize_value(&self, raw: &Value) -> NormalizedSeries {
        let Some(items) = raw.as_array() else {
            log_debug!(LogComponent::Domain("Normalizer"), "input rejected: not a list");
            return NormalizedSeries {
                series: Series::default(),
                report: NormalizationReport {
                    input_len: 0,
                    dropped: Vec::new(),
                    rejected_input: Some(DataError::NotAList),
                },
            };
        };
        self.normalize_items(items.iter().map(Value::as_object))
    }

    /// `None` items are not objects and are dropped at their position
    fn normalize_items<'a>(&self, items: impl ExactSizeIterator<Item = Option<&'a RawRecord>>) -> NormalizedSeries {
        let input_len = items.len();
        let mut dropped = Vec::new();
        let mut records = Vec::with_capacity(input_len);

        for (position, item) in items.enumerate() {
            let outcome = match item {
                Some(record) => self.canonicalize(record),
                None => Err(DataError::NotAnObject),
            };
            match outcome {
                Ok(canonical) => records.push(canonical),
                Err(reason) => dropped.push(DroppedRecord { position, reason }),
            }
        }

        log_debug!(
            LogComponent::Domain("Normalizer"),
            "normalized {} records, dropped {}",
            records.len(),
            dropped.len()
        );

        NormalizedSeries {
            series: Series::new(records),
            report: NormalizationReport { input_len, dropped, rejected_input: None },
        }
    }

    pub fn canonicalize(&self, record: &RawRecord) -> Result<OhlcvRecord, DataError> {
        let mut values = [None; 8];
        for (slot, candidates) in values.iter_mut().zip(&self.table) {
            *slot = lookup(record, &candidates.names);
        }

        let required = |field: CanonicalField| {
            values[field as usize].ok_or(DataError::MissingField(field))
        };
        let ohlcv = OHLCV::new(
            Price::from(required(CanonicalField::Open)?),
            Price::from(required(CanonicalField::High)?),
            Price::from(required(CanonicalField::Low)?),
            Price::from(required(CanonicalField::Close)?),
            Volume::from(required(CanonicalField::Volume)?),
        );

        if ohlcv.volume.value() < 0.0 {
            return Err(DataError::NegativeVolume);
        }
        if !ohlcv.is_valid() {
            return Err(DataError::InvalidOhlc);
        }

        let mut canonical = OhlcvRecord::new(ohlcv);
        for candidates in &self.table {
            if let Some(sma) = candidates.field.sma() {
                *canonical.sma_mut(sma) = values[candidates.field as usize].map(Price::from);
            }
        }
        Ok(canonical)
    }
}

/// Normalize with the default candidate table
pub fn normalize(raw: &[RawRecord]) -> NormalizedSeries {
    SchemaNormalizer::default().normalize(raw)
}

fn candidate_names(field: CanonicalField, accept_ema_as_sma: bool) -> Vec<String> {
    let canonical: &'static str = field.into();
    let mut names = vec![canonical.to_string()];

    match field.sma() {
        Some(sma) => {
            let n = sma.period();
            names.extend([
                format!("{n}sma"),
                format!("sma_{n}"),
                format!("{n}_sma"),
                format!("ma{n}"),
                format!("{n}ma"),
                format!("ma_{n}"),
            ]);
            if accept_ema_as_sma {
                names.extend([format!("ema{n}"), format!("{n}ema"), format!("ema_{n}")]);
            }
        }
        None => {
            let short = &canonical[..1];
            names.push(short.to_string());
            names.push(format!("{canonical}_price"));
            if field == CanonicalField::Volume {
                names.push("vol".to_string());
            }
        }
    }
    names
}

/// First numeric value among the candidates.
///
/// The exact canonical key wins; after that each candidate is matched ignoring case and,
/// among keys differing only by case, the lexicographically smallest parseable one is
/// taken so that key order in the source never changes the result.
fn lookup(record: &RawRecord, names: &[String]) -> Option<f64> {
    if let Some(value) = names.first().and_then(|exact| record.get(exact)).and_then(parse_number) {
        return Some(value);
    }

    names.iter().find_map(|name| {
        let mut matches: Vec<(&String, f64)> = record
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .filter_map(|(key, value)| parse_number(value).map(|v| (key, v)))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0));
        matches.first().map(|(_, v)| *v)
    })
}

fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn picks_exact_key_before_case_variants() {
        let record = raw(json!({"open": 1.0, "Open": 9.0, "high": 2, "low": 0.5, "close": 1.5, "volume": 10}));
        let canonical = SchemaNormalizer::default().canonicalize(&record).unwrap();
        assert_eq!(canonical.ohlcv.open.value(), 1.0);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let record = raw(json!({"Open": "1.0", "High": " 2 ", "Low": "0.5", "Close": "1.5", "Volume": "10"}));
        let canonical = SchemaNormalizer::default().canonicalize(&record).unwrap();
        assert_eq!(canonical.ohlcv.high.value(), 2.0);
    }

    #[test]
    fn unparseable_candidate_falls_through_to_synonym() {
        let record = raw(json!({"Open": "n/a", "o": 3.0, "High": 4, "Low": 2, "Close": 3, "Volume": 1}));
        let canonical = SchemaNormalizer::default().canonicalize(&record).unwrap();
        assert_eq!(canonical.ohlcv.open.value(), 3.0);
    }

    #[test]
    fn ema_is_ignored_unless_enabled() {
        let record = raw(json!({"Open": 1, "High": 2, "Low": 0.5, "Close": 1.5, "Volume": 1, "ema10": 1.2}));
        assert_eq!(SchemaNormalizer::new(false).canonicalize(&record).unwrap().sma10, None);
        assert_eq!(
            SchemaNormalizer::new(true).canonicalize(&record).unwrap().sma10,
            Some(Price::from(1.2))
        );
    }

    #[test]
    fn missing_field_reports_first_absent_in_canonical_order() {
        let record = raw(json!({"Open": 1, "Close": 1.5, "Volume": 1}));
        assert_eq!(
            SchemaNormalizer::default().canonicalize(&record),
            Err(DataError::MissingField(CanonicalField::High))
        );
    }

    #[test]
    fn slice_and_json_inputs_normalize_alike() {
        let good = json!({"Open": 1, "High": 2, "Low": 0.5, "Close": 1.5, "Volume": 1});
        let bad = json!({"Open": 1, "High": 0, "Low": 0.5, "Close": 1.5, "Volume": 1});
        let normalizer = SchemaNormalizer::default();

        let from_slice = normalizer.normalize(&[raw(good.clone()), raw(bad.clone())]);
        let from_json = normalizer.normalize_value(&json!([good, bad]));
        assert_eq!(from_slice, from_json);
        assert_eq!(from_json.report.dropped[0].position, 1);

        let with_scalar = normalizer.normalize_value(&json!([7, {"Open": 1}]));
        assert_eq!(with_scalar.report.input_len, 2);
        assert_eq!(with_scalar.report.dropped[0].reason, DataError::NotAnObject);
    }
}
