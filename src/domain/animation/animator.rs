use serde::Serialize;
use strum::{AsRefStr, Display};

use super::easing::{ease_out_cubic, phase_progress};
use super::scheduler::{FrameRequest, FrameScheduler, SubscriptionId};
use crate::domain::errors::AnimationStateError;
use crate::domain::logging::LogComponent;
use crate::{log_debug, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnimationPhase {
    Idle,
    Zooming,
    Revealing,
    Holding,
    Complete,
}

impl AnimationPhase {
    /// Phases during which every tick changes the picture
    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Zooming | Self::Revealing)
    }

    fn next(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Zooming => Self::Revealing,
            Self::Revealing => Self::Holding,
            Self::Holding | Self::Complete => Self::Complete,
        }
    }
}

/// Snapshot consumed by one frame's scale and geometry pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationState {
    pub phase: AnimationPhase,
    pub zoom_factor: f64,
    pub reveal_fraction: f64,
    /// Time spent in the current phase
    pub elapsed_ms: f64,
}

impl AnimationState {
    pub const IDLE: Self =
        Self { phase: AnimationPhase::Idle, zoom_factor: 0.0, reveal_fraction: 0.0, elapsed_ms: 0.0 };
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::IDLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTimings {
    pub zoom_ms: f64,
    pub reveal_ms: f64,
    pub hold_ms: f64,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self { zoom_ms: 1500.0, reveal_ms: 1800.0, hold_ms: 10_000.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseChange {
    pub from: AnimationPhase,
    pub to: AnimationPhase,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub state: AnimationState,
    pub transitions: Vec<PhaseChange>,
    /// Scales and geometry must be rebuilt for this tick
    pub redraw: bool,
    pub clock_error: Option<AnimationStateError>,
}

/// Zoom-then-reveal state machine.
///
/// `Idle -> Zooming -> Revealing -> Holding -> Complete`. Time only moves on `tick`;
/// each phase change cancels the current clock subscription before requesting the
/// one the new phase needs.
pub struct RevealAnimator<S: FrameScheduler> {
    timings: AnimationTimings,
    scheduler: S,
    subscription: Option<SubscriptionId>,
    state: AnimationState,
    /// Anchored by the first tick after a phase is entered
    phase_started_at: Option<f64>,
    /// Whether the current run has after records to show
    has_reveal: bool,
}

impl<S: FrameScheduler> RevealAnimator<S> {
    pub fn new(timings: AnimationTimings, scheduler: S) -> Self {
        Self {
            timings,
            scheduler,
            subscription: None,
            state: AnimationState::IDLE,
            phase_started_at: None,
            has_reveal: false,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn phase(&self) -> AnimationPhase {
        self.state.phase
    }

    pub fn timings(&self) -> AnimationTimings {
        self.timings
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// A new after series arrived: drop the previous run entirely and zoom from zero
    pub fn start(&mut self) -> Vec<PhaseChange> {
        self.has_reveal = true;
        vec![self.enter(AnimationPhase::Zooming, None, None)]
    }

    /// An empty after series arrived: nothing to reveal, go straight to `Complete`
    pub fn finish_without_reveal(&mut self) -> Vec<PhaseChange> {
        self.has_reveal = false;
        let mut changes = Vec::new();
        if self.state.phase != AnimationPhase::Idle {
            changes.push(self.enter(AnimationPhase::Idle, None, None));
        }
        changes.push(self.enter(AnimationPhase::Complete, None, None));
        changes
    }

    /// The after series was cleared
    pub fn reset(&mut self) -> Vec<PhaseChange> {
        self.has_reveal = false;
        if self.state.phase == AnimationPhase::Idle && self.subscription.is_none() {
            return Vec::new();
        }
        vec![self.enter(AnimationPhase::Idle, None, None)]
    }

    /// Release the clock subscription; the state is kept as it is
    pub fn cancel(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.scheduler.cancel(id);
        }
    }

    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        let start_phase = self.state.phase;
        let mut transitions = Vec::new();
        let mut clock_error = None;

        if matches!(start_phase, AnimationPhase::Idle | AnimationPhase::Complete) {
            return TickOutcome { state: self.state, transitions, redraw: false, clock_error };
        }

        if !now_ms.is_finite() {
            let error = AnimationStateError::NonFiniteTime { now_ms };
            log_warn!(LogComponent::Domain("Animator"), "{}", error);
            return TickOutcome { state: self.state, transitions, redraw: false, clock_error: Some(error) };
        }

        let mut started_at = *self.phase_started_at.get_or_insert(now_ms);
        let mut elapsed = now_ms - started_at;
        if elapsed < 0.0 {
            let error =
                AnimationStateError::ClockWentBackwards { now_ms, started_at_ms: started_at };
            log_warn!(LogComponent::Domain("Animator"), "{}", error);
            clock_error = Some(error);
            elapsed = 0.0;
        }

        while let Some(duration) = self.phase_duration(self.state.phase) {
            if elapsed < duration {
                break;
            }
            // Carry the overshoot into the next phase so tick spacing never shifts the timeline
            started_at += duration;
            elapsed -= duration;
            let next = self.state.phase.next();
            transitions.push(self.enter(next, Some(started_at), Some(now_ms)));
        }

        self.state.elapsed_ms = elapsed;
        self.apply_progress();

        // A one-shot timeout that fired early is spent; wait again for the remainder
        if start_phase == AnimationPhase::Holding && self.state.phase == AnimationPhase::Holding {
            self.cancel();
            let delay_ms = (self.timings.hold_ms - elapsed).max(0.0);
            self.subscription = Some(self.scheduler.subscribe(FrameRequest::After { delay_ms }));
        }

        TickOutcome {
            state: self.state,
            transitions,
            redraw: start_phase.is_animating(),
            clock_error,
        }
    }

    fn phase_duration(&self, phase: AnimationPhase) -> Option<f64> {
        match phase {
            AnimationPhase::Zooming => Some(self.timings.zoom_ms),
            AnimationPhase::Revealing => Some(self.timings.reveal_ms),
            AnimationPhase::Holding => Some(self.timings.hold_ms),
            AnimationPhase::Idle | AnimationPhase::Complete => None,
        }
    }

    fn apply_progress(&mut self) {
        let elapsed = self.state.elapsed_ms;
        let (zoom, reveal) = match self.state.phase {
            AnimationPhase::Idle => (0.0, 0.0),
            AnimationPhase::Zooming => {
                (ease_out_cubic(phase_progress(elapsed, self.timings.zoom_ms)), 0.0)
            }
            AnimationPhase::Revealing => {
                (1.0, ease_out_cubic(phase_progress(elapsed, self.timings.reveal_ms)))
            }
            AnimationPhase::Holding => (1.0, 1.0),
            AnimationPhase::Complete if self.has_reveal => (1.0, 1.0),
            AnimationPhase::Complete => (0.0, 0.0),
        };
        self.state.zoom_factor = zoom;
        self.state.reveal_fraction = reveal;
    }

    fn enter(
        &mut self,
        phase: AnimationPhase,
        started_at: Option<f64>,
        now_ms: Option<f64>,
    ) -> PhaseChange {
        let change = PhaseChange { from: self.state.phase, to: phase };
        self.cancel();

        self.state = AnimationState { phase, elapsed_ms: 0.0, ..AnimationState::IDLE };
        self.phase_started_at = started_at;
        self.apply_progress();

        let request = match phase {
            AnimationPhase::Zooming | AnimationPhase::Revealing => Some(FrameRequest::EveryFrame),
            AnimationPhase::Holding => {
                let waited = match (started_at, now_ms) {
                    (Some(start), Some(now)) => (now - start).max(0.0),
                    _ => 0.0,
                };
                Some(FrameRequest::After { delay_ms: (self.timings.hold_ms - waited).max(0.0) })
            }
            AnimationPhase::Idle | AnimationPhase::Complete => None,
        };
        self.subscription = request.map(|r| self.scheduler.subscribe(r));

        log_debug!(LogComponent::Domain("Animator"), "phase {} -> {}", change.from, change.to);
        change
    }
}

impl<S: FrameScheduler> Drop for RevealAnimator<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}
