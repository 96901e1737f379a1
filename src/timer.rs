//! Timers - scheduling collaborator for watchdogs and auto-reload.
//!
//! The framework never owns an event loop. Anything time-based goes
//! through the [`Timers`] trait supplied by the host. [`ManualTimers`] is
//! a virtual clock that fires callbacks as time is advanced explicitly;
//! it backs the tests and works for hosts that drive their own tick.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Handle returned by [`Timers::set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// One-shot timer scheduling.
pub trait Timers {
    /// Run `callback` once after `delay`.
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancel a pending timer. Unknown or fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}

struct Entry {
    id: TimerId,
    due: Duration,
    callback: Box<dyn FnOnce()>,
}

/// Virtual clock driven by [`ManualTimers::advance`].
///
/// Cloning shares the same clock.
#[derive(Clone, Default)]
pub struct ManualTimers {
    now: Rc<Cell<Duration>>,
    next_id: Rc<Cell<u64>>,
    pending: Rc<RefCell<Vec<Entry>>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of timers still waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Move the clock forward, firing every timer that becomes due in
    /// deadline order. Timers scheduled by callbacks fire in the same call
    /// if they fall inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;

        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                let earliest = pending
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.due <= target)
                    .min_by_key(|(_, e)| (e.due, e.id.0))
                    .map(|(i, _)| i);
                earliest.map(|i| pending.remove(i))
            };

            match next {
                Some(entry) => {
                    self.now.set(entry.due);
                    (entry.callback)();
                }
                None => break,
            }
        }

        self.now.set(target);
    }
}

impl Timers for ManualTimers {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.pending.borrow_mut().push(Entry {
            id,
            due: self.now.get() + delay,
            callback,
        });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.pending.borrow_mut().retain(|e| e.id != id);
    }
}

// =============================================================================
// Tests
// =============================================================================
