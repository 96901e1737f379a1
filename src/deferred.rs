//! Deferred - single-fire asynchronous result.
//!
//! Repository loads and document loads hand out a `Deferred` that starts
//! pending and settles exactly once, either resolved with a value or
//! rejected with a [`LoadError`]. Callbacks registered after settlement
//! run immediately, callbacks registered before run in registration order
//! at the moment of settlement.
//!
//! Everything runs on the UI thread: there is no executor, a deferred is
//! settled by whoever owns the other end (a transport response, a timer,
//! a status transition).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::LoadError;

/// Observable state of a [`Deferred`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
    Pending,
    Resolved,
    Rejected,
}

type Callback<T> = Box<dyn FnOnce(&Result<T, LoadError>)>;

enum Slot<T> {
    Pending(Vec<Callback<T>>),
    Settled(Result<T, LoadError>),
}

/// Shared handle to a single-fire result.
///
/// Cloning shares the same underlying result.
pub struct Deferred<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").field("state", &self.state()).finish()
    }
}

impl<T> Deferred<T> {
    pub fn state(&self) -> DeferredState {
        match &*self.slot.borrow() {
            Slot::Pending(_) => DeferredState::Pending,
            Slot::Settled(Ok(_)) => DeferredState::Resolved,
            Slot::Settled(Err(_)) => DeferredState::Rejected,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == DeferredState::Pending
    }
}

impl<T: Clone + 'static> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Deferred<T> {
    /// Create a pending deferred.
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Pending(Vec::new()))),
        }
    }

    /// Create an already resolved deferred.
    pub fn resolved(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Settled(Ok(value)))),
        }
    }

    /// Create an already rejected deferred.
    pub fn rejected(error: LoadError) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Settled(Err(error)))),
        }
    }

    /// Settled result, if any.
    pub fn result(&self) -> Option<Result<T, LoadError>> {
        match &*self.slot.borrow() {
            Slot::Pending(_) => None,
            Slot::Settled(result) => Some(result.clone()),
        }
    }

    /// Resolve with `value`. Returns false if already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Reject with `error`. Returns false if already settled.
    pub fn reject(&self, error: LoadError) -> bool {
        self.settle(Err(error))
    }

    fn settle(&self, result: Result<T, LoadError>) -> bool {
        let callbacks = {
            let mut slot = self.slot.borrow_mut();
            match &mut *slot {
                Slot::Settled(_) => return false,
                Slot::Pending(callbacks) => {
                    let callbacks = std::mem::take(callbacks);
                    *slot = Slot::Settled(result.clone());
                    callbacks
                }
            }
        };

        // Borrow released: callbacks may inspect or chain on this deferred.
        for callback in callbacks {
            callback(&result);
        }
        true
    }

    /// Run `callback` once the deferred settles, whatever the outcome.
    pub fn always(&self, callback: impl FnOnce(&Result<T, LoadError>) + 'static) -> &Self {
        let settled = {
            let mut slot = self.slot.borrow_mut();
            match &mut *slot {
                Slot::Pending(callbacks) => {
                    callbacks.push(Box::new(callback));
                    return self;
                }
                Slot::Settled(result) => result.clone(),
            }
        };
        callback(&settled);
        self
    }

    /// Run `callback` on resolution.
    pub fn done(&self, callback: impl FnOnce(&T) + 'static) -> &Self {
        self.always(move |result| {
            if let Ok(value) = result {
                callback(value);
            }
        })
    }

    /// Run `callback` on rejection.
    pub fn fail(&self, callback: impl FnOnce(&LoadError) + 'static) -> &Self {
        self.always(move |result| {
            if let Err(error) = result {
                callback(error);
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_resolve_fires_pending_callbacks_once() {
        let deferred = Deferred::<u32>::new();
        let seen = Rc::new(Cell::new(0));

        let s = seen.clone();
        deferred.done(move |v| s.set(s.get() + *v));
        assert_eq!(seen.get(), 0);
        assert!(deferred.is_pending());

        assert!(deferred.resolve(5));
        assert_eq!(seen.get(), 5);
        assert_eq!(deferred.state(), DeferredState::Resolved);

        // Single fire
        assert!(!deferred.resolve(7));
        assert!(!deferred.reject(LoadError::Timeout));
        assert_eq!(seen.get(), 5);
        assert_eq!(deferred.result(), Some(Ok(5)));
    }

    #[test]
    fn test_late_callbacks_run_immediately() {
        let deferred = Deferred::resolved("ok".to_string());
        let seen = Rc::new(RefCell::new(String::new()));

        let s = seen.clone();
        deferred.done(move |v| s.borrow_mut().push_str(v));
        assert_eq!(&*seen.borrow(), "ok");
    }

    #[test]
    fn test_reject_skips_done() {
        let deferred = Deferred::<()>::new();
        let done = Rc::new(Cell::new(false));
        let failed = Rc::new(Cell::new(false));

        let d = done.clone();
        let f = failed.clone();
        deferred.done(move |_| d.set(true)).fail(move |e| {
            assert_eq!(*e, LoadError::Timeout);
            f.set(true);
        });

        deferred.reject(LoadError::Timeout);
        assert!(!done.get());
        assert!(failed.get());
        assert_eq!(deferred.state(), DeferredState::Rejected);
    }

    #[test]
    fn test_callback_can_inspect_its_deferred() {
        let deferred = Deferred::<()>::new();
        let inner = deferred.clone();
        let observed = Rc::new(Cell::new(None));

        let o = observed.clone();
        deferred.always(move |_| o.set(Some(inner.state())));
        deferred.resolve(());

        assert_eq!(observed.get(), Some(DeferredState::Resolved));
    }

    #[test]
    fn test_debug_shows_state() {
        let deferred = Deferred::<u32>::new();
        assert_eq!(format!("{deferred:?}"), "Deferred { state: Pending }");

        deferred.reject(LoadError::Timeout);
        assert_eq!(format!("{deferred:?}"), "Deferred { state: Rejected }");
    }
}
