//! Master repository - reference data with a load lifecycle.
//!
//! Status moves `Ready -> Loading -> Loaded`, or to `Timeout` when the
//! owner gives up waiting. `load` coalesces: while a load is in flight,
//! callers get a deferred that settles with the status transition.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::ops::RangeBounds;
use std::rc::Rc;

use spark_signals::{signal, Signal};
use tracing::{debug, warn};

use super::{comparator, fallible, infallible, Pipeline};
use crate::deferred::Deferred;
use crate::error::{LoadError, PolicyError, RepositoryError};
use crate::types::RepositoryStatus;

struct MasterInner<T: Clone + PartialEq + 'static> {
    pipeline: Pipeline<T>,
    status: Signal<RepositoryStatus>,
    /// Deferreds handed out while `Loading`.
    waiters: RefCell<Vec<Deferred<()>>>,
}

/// Shared handle to a master repository.
pub struct MasterRepository<T: Clone + PartialEq + Default + 'static> {
    inner: Rc<MasterInner<T>>,
}

impl<T: Clone + PartialEq + Default + 'static> Clone for MasterRepository<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for MasterRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Default + 'static> MasterRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(MasterInner {
                pipeline: Pipeline::new(),
                status: signal(RepositoryStatus::Ready),
                waiters: RefCell::new(Vec::new()),
            }),
        }
    }

    // =========================================================================
    // Status
    // =========================================================================

    pub fn status(&self) -> RepositoryStatus {
        self.inner.status.get()
    }

    pub fn status_signal(&self) -> Signal<RepositoryStatus> {
        self.inner.status.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.status() == RepositoryStatus::Ready
    }

    pub fn is_loading(&self) -> bool {
        self.status() == RepositoryStatus::Loading
    }

    pub fn is_loaded(&self) -> bool {
        self.status() == RepositoryStatus::Loaded
    }

    pub fn is_timeout(&self) -> bool {
        self.status() == RepositoryStatus::Timeout
    }

    fn set_status(&self, status: RepositoryStatus) -> bool {
        if self.inner.status.get() == status {
            return false;
        }
        debug!(?status, "master repository status");
        self.inner.status.set(status);
        true
    }

    /// Mark a load as in flight.
    pub fn loading(&self) -> &Self {
        self.set_status(RepositoryStatus::Loading);
        self
    }

    /// Mark the data as loaded and resolve every waiting `load`.
    pub fn loaded(&self) -> &Self {
        if self.set_status(RepositoryStatus::Loaded) {
            for waiter in self.take_waiters() {
                waiter.resolve(());
            }
        }
        self
    }

    /// Give up on the in-flight load and reject every waiting `load`.
    pub fn timed_out(&self) -> &Self {
        if self.set_status(RepositoryStatus::Timeout) {
            for waiter in self.take_waiters() {
                waiter.reject(LoadError::Timeout);
            }
        }
        self
    }

    fn take_waiters(&self) -> Vec<Deferred<()>> {
        std::mem::take(&mut *self.inner.waiters.borrow_mut())
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace the source with `items` and publish.
    ///
    /// Resolves immediately when already loaded. While another load is in
    /// flight the returned deferred settles with that load instead, and
    /// `items` is ignored.
    pub fn load(&self, items: Vec<T>) -> Deferred<()> {
        match self.status() {
            RepositoryStatus::Loaded => Deferred::resolved(()),
            RepositoryStatus::Loading => {
                let waiter = Deferred::new();
                self.inner.waiters.borrow_mut().push(waiter.clone());
                waiter
            }
            RepositoryStatus::Ready | RepositoryStatus::Timeout => {
                self.clear().add_source(items).apply_policies().loaded();
                Deferred::resolved(())
            }
        }
    }

    /// Reset source and published records together.
    pub fn clear(&self) -> &Self {
        self.inner.pipeline.clear();
        self
    }

    // =========================================================================
    // Source
    // =========================================================================

    pub fn add_source(&self, items: impl IntoIterator<Item = T>) -> &Self {
        self.inner.pipeline.add_source(items);
        self
    }

    pub fn get_source(&self, range: impl RangeBounds<usize>) -> Vec<T> {
        self.inner.pipeline.source(range)
    }

    pub fn get_source_length(&self) -> usize {
        self.inner.pipeline.source_len()
    }

    // =========================================================================
    // Policies
    // =========================================================================

    pub fn add_filter_policy(&self, filter: impl Fn(Vec<T>) -> Vec<T> + 'static) -> &Self {
        self.inner.pipeline.add_filter(infallible(filter));
        self
    }

    /// Add a filter that may fail. A failure aborts the whole publication.
    pub fn add_fallible_filter_policy(
        &self,
        filter: impl Fn(Vec<T>) -> Result<Vec<T>, PolicyError> + 'static,
    ) -> &Self {
        self.inner.pipeline.add_filter(fallible(filter));
        self
    }

    pub fn clear_filter_policies(&self) -> &Self {
        self.inner.pipeline.clear_filters();
        self
    }

    /// Replace the comparator.
    pub fn set_sort_policy(&self, compare: impl Fn(&T, &T) -> Ordering + 'static) -> &Self {
        self.inner.pipeline.set_sort(comparator(compare));
        self
    }

    pub fn delete_sort_policy(&self) -> &Self {
        self.inner.pipeline.delete_sort();
        self
    }

    /// Republish, logging a failed chain.
    pub fn apply_policies(&self) -> &Self {
        self.inner.pipeline.publish();
        self
    }

    /// Republish, returning a failed chain to the caller.
    pub fn try_apply_policies(&self) -> Result<(), RepositoryError> {
        self.inner.pipeline.try_publish()
    }

    // =========================================================================
    // Published Records
    // =========================================================================

    pub fn get_master(&self, range: impl RangeBounds<usize>) -> Vec<T> {
        self.inner.pipeline.published(range)
    }

    pub fn get_master_length(&self) -> usize {
        self.inner.pipeline.published_len()
    }

    /// Published records matching `predicate`.
    pub fn select(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.inner
            .pipeline
            .published_all()
            .into_iter()
            .filter(|item| predicate(item))
            .collect()
    }

    /// First published record, or the null object.
    pub fn get_fallback(&self) -> T {
        match self.inner.pipeline.published(..1).into_iter().next() {
            Some(first) => first,
            None => {
                warn!("no published records, falling back to the null object");
                self.create_null_object()
            }
        }
    }

    pub fn create_null_object(&self) -> T {
        T::default()
    }

    pub fn is_null_object(&self, item: &T) -> bool {
        *item == self.create_null_object()
    }

    pub fn get_changed_times(&self) -> u64 {
        self.inner.pipeline.changed_times()
    }

    /// Counter bumped once per publication.
    pub fn changed_signal(&self) -> Signal<u64> {
        self.inner.pipeline.changed_signal()
    }
}
