//! Time-driven zoom and reveal sequence.

pub mod animator;
pub mod easing;
pub mod scheduler;

pub use animator::{
    AnimationPhase, AnimationState, AnimationTimings, PhaseChange, RevealAnimator, TickOutcome,
};
pub use easing::{ease_out_cubic, phase_progress};
pub use scheduler::{FrameRequest, FrameScheduler, ManualScheduler, SubscriptionId};
