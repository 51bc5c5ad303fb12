//! Clock subscriptions owned by the animator.
//!
//! The animator never schedules work itself; it asks a [`FrameScheduler`] for a
//! subscription and cancels it before asking for the next one, so at most one is
//! live per animator.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// What the animator needs from the clock in its current phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameRequest {
    /// Tick on every display frame
    EveryFrame,
    /// Tick once after a delay
    After { delay_ms: f64 },
}

pub trait FrameScheduler {
    fn subscribe(&mut self, request: FrameRequest) -> SubscriptionId;
    /// Unknown or already cancelled ids are ignored
    fn cancel(&mut self, id: SubscriptionId);
}

/// Headless scheduler: keeps the book of live subscriptions while the caller
/// drives `tick` by hand.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    active: BTreeMap<SubscriptionId, FrameRequest>,
    peak_active: usize,
    subscribed_total: usize,
    cancelled_total: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Highest number of simultaneously live subscriptions ever seen
    pub fn peak_active(&self) -> usize {
        self.peak_active
    }

    pub fn subscribed_total(&self) -> usize {
        self.subscribed_total
    }

    pub fn cancelled_total(&self) -> usize {
        self.cancelled_total
    }

    pub fn current(&self) -> Option<(SubscriptionId, FrameRequest)> {
        self.active.iter().next_back().map(|(id, request)| (*id, *request))
    }

    pub fn is_active(&self, id: SubscriptionId) -> bool {
        self.active.contains_key(&id)
    }
}

impl FrameScheduler for ManualScheduler {
    fn subscribe(&mut self, request: FrameRequest) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.active.insert(id, request);
        self.subscribed_total += 1;
        self.peak_active = self.peak_active.max(self.active.len());
        id
    }

    fn cancel(&mut self, id: SubscriptionId) {
        if self.active.remove(&id).is_some() {
            self.cancelled_total += 1;
        }
    }
}

impl<T: FrameScheduler + ?Sized> FrameScheduler for &mut T {
    fn subscribe(&mut self, request: FrameRequest) -> SubscriptionId {
        (**self).subscribe(request)
    }

    fn cancel(&mut self, id: SubscriptionId) {
        (**self).cancel(id)
    }
}
