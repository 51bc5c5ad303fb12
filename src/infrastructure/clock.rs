//! Display-frame clock for the browser.
//!
//! Every subscription is backed by exactly one pending `requestAnimationFrame` or
//! `setTimeout` handle. Dropping the handle cancels it, so replacing or cancelling a
//! subscription can never leave a stray callback behind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;

use crate::domain::animation::{FrameRequest, FrameScheduler, SubscriptionId};
use crate::domain::logging::LogComponent;
use crate::log_warn;

enum PendingCallback {
    Frame(AnimationFrame),
    Timeout(Timeout),
}

struct Subscription {
    id: SubscriptionId,
    request: FrameRequest,
    pending: Option<PendingCallback>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    active: Option<Subscription>,
    /// Handle of the callback currently running; released on the next fire
    retired: Option<PendingCallback>,
    handler: Option<Rc<dyn Fn(f64)>>,
}

/// [`FrameScheduler`] driven by the browser's display refresh.
///
/// Clones share one subscription book. The tick handler is installed after the engine
/// that owns the scheduler exists, typically as a closure holding a weak engine handle.
#[derive(Clone, Default)]
pub struct BrowserFrameScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl BrowserFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tick_handler<F>(&self, handler: F)
    where
        F: Fn(f64) + 'static,
    {
        self.inner.borrow_mut().handler = Some(Rc::new(handler));
    }

    pub fn clear_tick_handler(&self) {
        self.inner.borrow_mut().handler = None;
    }

    pub fn has_pending(&self) -> bool {
        self.inner.borrow().active.as_ref().is_some_and(|s| s.pending.is_some())
    }
}

impl FrameScheduler for BrowserFrameScheduler {
    fn subscribe(&mut self, request: FrameRequest) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        let pending = arm(Rc::downgrade(&self.inner), id, request);
        if inner.active.replace(Subscription { id, request, pending: Some(pending) }).is_some() {
            log_warn!(
                LogComponent::Infrastructure("FrameScheduler"),
                "subscription replaced without cancel"
            );
        }
        id
    }

    fn cancel(&mut self, id: SubscriptionId) {
        let mut inner = self.inner.borrow_mut();
        if inner.active.as_ref().is_some_and(|s| s.id == id) {
            inner.active = None;
        }
    }
}

/// Browser high resolution clock, the same one animation frames are stamped with
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn arm(inner: Weak<RefCell<Inner>>, id: SubscriptionId, request: FrameRequest) -> PendingCallback {
    match request {
        FrameRequest::EveryFrame => PendingCallback::Frame(request_animation_frame(move |timestamp| {
            fire(&inner, id, timestamp)
        })),
        FrameRequest::After { delay_ms } => {
            let delay = delay_ms.ceil().clamp(0.0, u32::MAX as f64) as u32;
            PendingCallback::Timeout(Timeout::new(delay, move || fire(&inner, id, now_ms())))
        }
    }
}

fn fire(inner: &Weak<RefCell<Inner>>, id: SubscriptionId, now: f64) {
    let Some(shared) = inner.upgrade() else {
        return;
    };
    let handler = {
        let mut guard = shared.borrow_mut();
        let state = &mut *guard;
        let Some(active) = state.active.as_mut().filter(|s| s.id == id) else {
            return;
        };
        state.retired = active.pending.take();
        if active.request == FrameRequest::EveryFrame {
            active.pending = Some(arm(inner.clone(), id, active.request));
        }
        state.handler.clone()
    };
    // The handler re-enters the scheduler through the animator, so no borrow is held here
    if let Some(handler) = handler {
        handler(now);
    }
}
