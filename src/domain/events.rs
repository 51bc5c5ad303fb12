use serde::Serialize;
use std::fmt::Debug;

use crate::domain::animation::{AnimationPhase, PhaseChange};
use crate::domain::market_data::SegmentKind;

/// Base trait for all domain events
pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &'static str;
}

/// What the engine tells the surrounding application
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChartEvent {
    #[serde(rename_all = "camelCase")]
    DataLoaded { segment: SegmentKind, accepted: usize, dropped: usize },
    #[serde(rename_all = "camelCase")]
    PhaseChanged { from: AnimationPhase, to: AnimationPhase },
    AfterCleared,
}

impl From<PhaseChange> for ChartEvent {
    fn from(change: PhaseChange) -> Self {
        Self::PhaseChanged { from: change.from, to: change.to }
    }
}

impl DomainEvent for ChartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ChartEvent::DataLoaded { .. } => "DataLoaded",
            ChartEvent::PhaseChanged { .. } => "PhaseChanged",
            ChartEvent::AfterCleared => "AfterCleared",
        }
    }
}

pub trait EventDispatcher {
    fn publish_chart_event(&self, event: ChartEvent);
}

/// Synchronous in-memory dispatcher; handlers run in subscription order
#[derive(Default)]
pub struct InMemoryEventDispatcher {
    chart_handlers: Vec<Box<dyn Fn(&ChartEvent)>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_to_chart_events<F>(&mut self, handler: F)
    where
        F: Fn(&ChartEvent) + 'static,
    {
        self.chart_handlers.push(Box::new(handler));
    }

    pub fn handler_count(&self) -> usize {
        self.chart_handlers.len()
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn publish_chart_event(&self, event: ChartEvent) {
        for handler in &self.chart_handlers {
            handler(&event);
        }
    }
}
