//! Market data aggregate: canonical records, schema normalization and moving averages.

pub mod entities;
pub mod moving_average;
pub mod normalizer;
pub mod value_objects;

pub use entities::*;
pub use moving_average::{fill_missing_sma, required_coverage, sma_values, with_sma};
pub use normalizer::{NormalizationReport, NormalizedSeries, SchemaNormalizer, normalize};
pub use value_objects::*;
