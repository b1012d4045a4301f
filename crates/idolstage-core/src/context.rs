//! Shared state handed to every component.

use std::time::Duration;

use crate::config::StageConfig;
use crate::dom::Dom;
use crate::listeners::ListenerRegistry;
use crate::scroll_lock::ScrollLock;
use crate::timer::{TimerId, TimerQueue};
use crate::transition::Deferred;

/// Document, clock and registries owned by a [`Stage`](crate::Stage).
///
/// Components keep their own state and borrow this context for the duration
/// of one operation.
#[derive(Debug)]
pub struct StageContext<D> {
    pub dom: D,
    pub config: StageConfig,
    pub timers: TimerQueue<Deferred>,
    pub listeners: ListenerRegistry,
    pub scroll_lock: ScrollLock,
    /// Simulated time since the stage was created
    pub now: Duration,
}

impl<D: Dom> StageContext<D> {
    pub fn new(dom: D, config: StageConfig) -> Self {
        Self {
            dom,
            config,
            timers: TimerQueue::new(),
            listeners: ListenerRegistry::new(),
            scroll_lock: ScrollLock::new(),
            now: Duration::ZERO,
        }
    }

    /// Schedule `action` to run `delay` from now.
    pub fn after(&mut self, delay: Duration, action: Deferred) -> TimerId {
        self.timers.schedule_at(self.now + delay, action)
    }
}
