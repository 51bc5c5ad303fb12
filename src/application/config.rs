use serde::Deserialize;

use crate::domain::animation::AnimationTimings;
use crate::domain::chart::ChartVariant;
use crate::domain::errors::{ChartError, ChartResult};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::SmaField;
use crate::log_warn;

/// Longest dwell accepted for the holding phase
pub const MAX_HOLD_DURATION_MS: f64 = 60_000.0;

/// Engine configuration, usually handed over from JS as camelCase JSON
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub periods: Vec<usize>,
    pub zoom_duration_ms: f64,
    pub reveal_duration_ms: f64,
    pub hold_duration_ms: f64,
    pub chart_variant: ChartVariant,
    pub accept_ema_as_sma: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let timings = AnimationTimings::default();
        Self {
            periods: vec![10, 20, 50],
            zoom_duration_ms: timings.zoom_ms,
            reveal_duration_ms: timings.reveal_ms,
            hold_duration_ms: timings.hold_ms,
            chart_variant: ChartVariant::Default,
            accept_ema_as_sma: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ChartError::Config(format!("invalid engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ChartResult<()> {
        let durations = [
            ("zoomDurationMs", self.zoom_duration_ms),
            ("revealDurationMs", self.reveal_duration_ms),
            ("holdDurationMs", self.hold_duration_ms),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::Config(format!("{name} must be a non-negative number")));
            }
        }
        if self.hold_duration_ms > MAX_HOLD_DURATION_MS {
            return Err(ChartError::Config(format!(
                "holdDurationMs must not exceed {MAX_HOLD_DURATION_MS}"
            )));
        }
        Ok(())
    }

    pub fn timings(&self) -> AnimationTimings {
        AnimationTimings {
            zoom_ms: self.zoom_duration_ms,
            reveal_ms: self.reveal_duration_ms,
            hold_ms: self.hold_duration_ms,
        }
    }

    /// Configured periods that map to a record slot, in configured order, deduplicated
    pub fn sma_fields(&self) -> Vec<SmaField> {
        let mut fields = Vec::with_capacity(self.periods.len());
        for &period in &self.periods {
            match SmaField::for_period(period) {
                Some(field) if !fields.contains(&field) => fields.push(field),
                Some(_) => {}
                None => {
                    log_warn!(
                        LogComponent::Application("Config"),
                        "ignoring unsupported SMA period {}",
                        period
                    );
                }
            }
        }
        fields
    }

    /// Averages to draw: configured and shown by the chart variant
    pub fn visible_averages(&self) -> Vec<SmaField> {
        self.sma_fields().into_iter().filter(|f| self.chart_variant.shows_average(*f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn camel_case_fields_are_read() {
        let config = EngineConfig::from_json(
            r#"{"periods":[20,7,20],"holdDurationMs":5000,"chartVariant":"hourly"}"#,
        )
        .unwrap();
        assert_eq!(config.hold_duration_ms, 5000.0);
        assert_eq!(config.chart_variant, ChartVariant::Hourly);
        assert_eq!(config.sma_fields(), vec![SmaField::Sma20]);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let err = EngineConfig::from_json(r#"{"zoomDurationMs":-1}"#).unwrap_err();
        assert!(matches!(err, ChartError::Config(_)));
    }

    #[test]
    fn hold_above_limit_is_rejected() {
        assert!(EngineConfig::from_json(r#"{"holdDurationMs":600000}"#).is_err());
    }
}
