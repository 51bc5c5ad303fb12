use serde::Serialize;
use serde_json::Value;

use crate::application::config::EngineConfig;
use crate::domain::animation::{
    AnimationPhase, AnimationState, FrameScheduler, PhaseChange, RevealAnimator,
};
use crate::domain::chart::{
    ChartVariant, Dimensions, Primitive, ScaleSet, Segment, compute_scales, to_primitives,
};
use crate::domain::errors::{ChartResult, DomainError};
use crate::domain::events::{ChartEvent, EventDispatcher, InMemoryEventDispatcher};
use crate::domain::logging::{LogComponent, LogLevel, get_logger};
use crate::domain::market_data::{
    NormalizationReport, NormalizedSeries, RawRecord, SchemaNormalizer, SegmentKind, Series,
    fill_missing_sma,
};
use crate::{log_debug, log_info};

/// Per-frame diagnostics for the non-fatal problems the engine absorbed
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub dropped_before: usize,
    pub dropped_after: usize,
    /// An input was not a list at all
    pub rejected_inputs: usize,
    /// Degenerate domains replaced in this frame
    pub domain_substitutions: Vec<DomainError>,
    /// Ticks that arrived before their phase start, since the round was loaded
    pub clock_regressions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    /// Before-segment primitives first, then the revealed part of the after segment
    pub primitives: Vec<Primitive>,
    pub scales: ScaleSet,
    pub state: AnimationState,
    pub variant: ChartVariant,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "frame", rename_all = "camelCase")]
pub enum RenderOutput {
    /// No valid before record: nothing can be drawn
    NoData,
    Frame(RenderFrame),
}

impl RenderOutput {
    pub fn frame(&self) -> Option<&RenderFrame> {
        match self {
            Self::Frame(frame) => Some(frame),
            Self::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Consumer of engine output; drawing itself happens outside this crate
pub trait RenderAdapter {
    fn draw(&mut self, output: &RenderOutput);
}

/// Ties normalization, averages, scales, geometry and the animator together.
///
/// Input changes, resizes and clock ticks all funnel into one recompute that reads the
/// animation state exactly once.
pub struct RevealChartEngine<S: FrameScheduler> {
    config: EngineConfig,
    normalizer: SchemaNormalizer,
    dimensions: Dimensions,
    /// Normalized input as received, before SMA gaps are filled
    before_source: Series,
    after_source: Option<Series>,
    before: Series,
    after: Option<Series>,
    before_report: NormalizationReport,
    after_report: Option<NormalizationReport>,
    animator: RevealAnimator<S>,
    events: InMemoryEventDispatcher,
    clock_regressions: usize,
}

impl<S: FrameScheduler> RevealChartEngine<S> {
    pub fn new(config: EngineConfig, dimensions: Dimensions, scheduler: S) -> ChartResult<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: SchemaNormalizer::new(config.accept_ema_as_sma),
            animator: RevealAnimator::new(config.timings(), scheduler),
            config,
            dimensions,
            before_source: Series::default(),
            after_source: None,
            before: Series::default(),
            after: None,
            before_report: NormalizationReport::default(),
            after_report: None,
            events: InMemoryEventDispatcher::new(),
            clock_regressions: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn state(&self) -> AnimationState {
        self.animator.state()
    }

    pub fn phase(&self) -> AnimationPhase {
        self.animator.phase()
    }

    pub fn animator(&self) -> &RevealAnimator<S> {
        &self.animator
    }

    pub fn before(&self) -> &Series {
        &self.before
    }

    pub fn after(&self) -> Option<&Series> {
        self.after.as_ref()
    }

    pub fn before_report(&self) -> &NormalizationReport {
        &self.before_report
    }

    pub fn after_report(&self) -> Option<&NormalizationReport> {
        self.after_report.as_ref()
    }

    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: Fn(&ChartEvent) + 'static,
    {
        self.events.subscribe_to_chart_events(handler);
    }

    /// Start a new round: replaces `before`, drops `after`, cancels the clock
    pub fn load_round(&mut self, before: &Value) -> RenderOutput {
        let normalized = self.normalizer.normalize_value(before);
        self.install_round(normalized)
    }

    pub fn load_round_records(&mut self, before: &[RawRecord]) -> RenderOutput {
        let normalized = self.normalizer.normalize(before);
        self.install_round(normalized)
    }

    /// Supply the after segment. The same series twice is a no-op.
    pub fn set_after(&mut self, after: &Value) -> RenderOutput {
        let normalized = self.normalizer.normalize_value(after);
        self.install_after(normalized)
    }

    pub fn set_after_records(&mut self, after: &[RawRecord]) -> RenderOutput {
        let normalized = self.normalizer.normalize(after);
        self.install_after(normalized)
    }

    pub fn clear_after(&mut self) -> RenderOutput {
        if self.after_source.is_some() {
            self.after_source = None;
            self.after_report = None;
            self.refresh_series();
            self.events.publish_chart_event(ChartEvent::AfterCleared);
        }
        let changes = self.animator.reset();
        self.publish_phase_changes(changes);
        self.render()
    }

    pub fn resize(&mut self, dimensions: Dimensions) -> RenderOutput {
        self.dimensions = dimensions;
        self.render()
    }

    /// Advance the animation. Returns a fresh frame only when the picture changed.
    pub fn tick(&mut self, now_ms: f64) -> Option<RenderOutput> {
        let outcome = self.animator.tick(now_ms);
        if outcome.clock_error.is_some() {
            self.clock_regressions += 1;
        }
        self.publish_phase_changes(outcome.transitions);
        outcome.redraw.then(|| self.render_with(outcome.state))
    }

    /// Recompute the current frame from the present animation snapshot
    pub fn render(&self) -> RenderOutput {
        self.render_with(self.animator.state())
    }

    pub fn draw(&self, adapter: &mut dyn RenderAdapter) {
        adapter.draw(&self.render());
    }

    /// Release the clock subscription when the owning view goes away
    pub fn teardown(&mut self) {
        self.animator.cancel();
    }

    fn install_round(&mut self, normalized: NormalizedSeries) -> RenderOutput {
        if self.after_source.is_some() {
            self.events.publish_chart_event(ChartEvent::AfterCleared);
        }
        let changes = self.animator.reset();
        self.publish_phase_changes(changes);

        self.report_dropped(SegmentKind::Before, &normalized.report);
        self.before_source = normalized.series;
        self.before_report = normalized.report;
        self.after_source = None;
        self.after_report = None;
        self.clock_regressions = 0;
        self.refresh_series();

        get_logger().info(
            LogComponent::Application("ChartEngine"),
            &format!("round loaded with {} before records", self.before.len()),
        );
        self.events.publish_chart_event(ChartEvent::DataLoaded {
            segment: SegmentKind::Before,
            accepted: self.before.len(),
            dropped: self.before_report.dropped_count(),
        });
        self.render()
    }

    fn install_after(&mut self, normalized: NormalizedSeries) -> RenderOutput {
        if self.after_source.as_ref() == Some(&normalized.series) {
            log_debug!(LogComponent::Application("ChartEngine"), "after series unchanged");
            return self.render();
        }

        self.report_dropped(SegmentKind::After, &normalized.report);
        let empty = normalized.series.is_empty();
        self.events.publish_chart_event(ChartEvent::DataLoaded {
            segment: SegmentKind::After,
            accepted: normalized.series.len(),
            dropped: normalized.report.dropped_count(),
        });
        self.after_source = Some(normalized.series);
        self.after_report = Some(normalized.report);
        self.refresh_series();

        let changes = if empty {
            log_info!(LogComponent::Application("ChartEngine"), "empty after series, nothing to reveal");
            self.animator.finish_without_reveal()
        } else {
            self.animator.start()
        };
        self.publish_phase_changes(changes);
        self.render()
    }

    /// Rebuild the working series with every configured average filled in
    fn refresh_series(&mut self) {
        let mut before = self.before_source.clone();
        let mut after = self.after_source.clone();
        for field in self.config.sma_fields() {
            let (b, a) = fill_missing_sma(&before, after.as_ref(), field.period(), field);
            before = b;
            after = a;
        }
        self.before = before;
        self.after = after;
    }

    fn render_with(&self, state: AnimationState) -> RenderOutput {
        if self.before.is_empty() {
            return RenderOutput::NoData;
        }

        let computation = compute_scales(&self.before, self.after.as_ref(), &state, self.dimensions);
        if !computation.issues.is_empty() {
            log_debug!(
                LogComponent::Application("ChartEngine"),
                "substituted epsilon domains: {:?}",
                computation.issues
            );
        }
        let scales = computation.scales;
        let averages = self.config.visible_averages();

        let mut primitives = to_primitives(&self.before, &scales, Segment::Before, 1.0, &averages);
        if let Some(after) = &self.after {
            primitives.extend(to_primitives(
                after,
                &scales,
                Segment::After { start_index: self.before.len() },
                state.reveal_fraction,
                &averages,
            ));
        }

        let rejected_inputs = [Some(&self.before_report), self.after_report.as_ref()]
            .into_iter()
            .flatten()
            .filter(|r| r.rejected_input.is_some())
            .count();

        RenderOutput::Frame(RenderFrame {
            primitives,
            scales,
            state,
            variant: self.config.chart_variant,
            diagnostics: Diagnostics {
                dropped_before: self.before_report.dropped_count(),
                dropped_after: self.after_report.as_ref().map_or(0, |r| r.dropped_count()),
                rejected_inputs,
                domain_substitutions: computation.issues,
                clock_regressions: self.clock_regressions,
            },
        })
    }

    fn report_dropped(&self, segment: SegmentKind, report: &NormalizationReport) {
        if let Some(error) = &report.rejected_input {
            get_logger().warn(
                LogComponent::Application("ChartEngine"),
                &format!("{segment} input rejected: {error}"),
            );
        }
        if report.dropped_count() > 0 {
            let reasons = report
                .dropped
                .iter()
                .map(|d| format!("#{}: {}", d.position, d.reason))
                .collect::<Vec<_>>()
                .join("; ");
            get_logger().log_with_metadata(
                LogLevel::Warn,
                LogComponent::Application("ChartEngine"),
                &format!("dropped {} of {} {segment} records", report.dropped_count(), report.input_len),
                &reasons,
            );
        }
    }

    fn publish_phase_changes(&self, changes: Vec<PhaseChange>) {
        for change in changes {
            self.events.publish_chart_event(change.into());
        }
    }
}
