use super::value_objects::{OHLCV, Price, SmaField};
use serde::Serialize;
use std::ops::Index;
use std::sync::Arc;

/// Record as delivered by the data source: arbitrary keys, arbitrary casing
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Domain entity - canonical OHLCV bar with its moving averages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvRecord {
    pub ohlcv: OHLCV,
    pub sma10: Option<Price>,
    pub sma20: Option<Price>,
    pub sma50: Option<Price>,
}

impl OhlcvRecord {
    pub fn new(ohlcv: OHLCV) -> Self {
        Self { ohlcv, sma10: None, sma20: None, sma50: None }
    }

    pub fn is_bullish(&self) -> bool {
        self.ohlcv.close > self.ohlcv.open
    }

    pub fn sma(&self, field: SmaField) -> Option<Price> {
        match field {
            SmaField::Sma10 => self.sma10,
            SmaField::Sma20 => self.sma20,
            SmaField::Sma50 => self.sma50,
        }
    }

    pub fn sma_mut(&mut self, field: SmaField) -> &mut Option<Price> {
        match field {
            SmaField::Sma10 => &mut self.sma10,
            SmaField::Sma20 => &mut self.sma20,
            SmaField::Sma50 => &mut self.sma50,
        }
    }

    /// Prices that must fit the vertical domain: high, low, close and every average
    pub fn price_points(&self) -> impl Iterator<Item = f64> + '_ {
        [self.ohlcv.high, self.ohlcv.low, self.ohlcv.close]
            .into_iter()
            .map(|p| p.value())
            .chain([self.sma10, self.sma20, self.sma50].into_iter().flatten().map(|p| p.value()))
    }
}

/// Domain entity - immutable, chronologically ordered bars.
///
/// Cloning shares the underlying buffer; changes always build a new series.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Series {
    records: Arc<[OhlcvRecord]>,
}

impl Series {
    pub fn new(records: Vec<OhlcvRecord>) -> Self {
        Self { records: records.into() }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[OhlcvRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OhlcvRecord> {
        self.records.iter()
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.ohlcv.close.value())
    }

    /// Lowest and highest of every price point, `None` for an empty series
    pub fn price_extent(&self) -> Option<(f64, f64)> {
        extent(self.records.iter().flat_map(|r| r.price_points()))
    }

    pub fn max_volume(&self) -> Option<f64> {
        self.records.iter().map(|r| r.ohlcv.volume.value()).reduce(f64::max)
    }

    /// Build a new series by transforming a copy of every record
    pub fn map_records(&self, mut f: impl FnMut(usize, &mut OhlcvRecord)) -> Self {
        let records = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let mut record = r.clone();
                f(i, &mut record);
                record
            })
            .collect::<Vec<_>>();
        Self::new(records)
    }
}

impl Index<usize> for Series {
    type Output = OhlcvRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl FromIterator<OhlcvRecord> for Series {
    fn from_iter<T: IntoIterator<Item = OhlcvRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a OhlcvRecord;
    type IntoIter = std::slice::Iter<'a, OhlcvRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Min/max over finite values only
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
