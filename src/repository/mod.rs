//! Repositories - append-only sources published through policies.
//!
//! A repository keeps the raw `source` records and a `published` view
//! produced by its [`PolicySet`]. Every successful publication bumps a
//! change counter exactly once, which is what views subscribe to.
//!
//! - [`MasterRepository`] - reference data with a load lifecycle
//! - [`DataRepository`] - working data, published on demand
//!
//! Handles are cheap to clone and share one repository. All accessors
//! return copies.

mod data;
mod master;
mod policy;

pub use data::DataRepository;
pub use master::MasterRepository;
pub use policy::{FilterPolicy, PolicySet, SortPolicy};

use std::cell::RefCell;
use std::cmp::Ordering;
use std::ops::{Bound, RangeBounds};
use std::rc::Rc;

use spark_signals::{signal, Signal};
use tracing::{error, trace};

use crate::error::{PolicyError, RepositoryError};

// =============================================================================
// Pipeline
// =============================================================================

/// Source, published view and policies shared by both repository kinds.
pub(crate) struct Pipeline<T: Clone + PartialEq + 'static> {
    source: Signal<Vec<T>>,
    published: Signal<Vec<T>>,
    changed: Signal<u64>,
    policies: RefCell<PolicySet<T>>,
}

impl<T: Clone + PartialEq + 'static> Pipeline<T> {
    pub(crate) fn new() -> Self {
        Self {
            source: signal(Vec::new()),
            published: signal(Vec::new()),
            changed: signal(0),
            policies: RefCell::new(PolicySet::default()),
        }
    }

    pub(crate) fn add_source(&self, items: impl IntoIterator<Item = T>) {
        let mut source = self.source.get();
        let before = source.len();
        source.extend(items);
        if source.len() > before {
            self.source.set(source);
        }
    }

    pub(crate) fn source(&self, range: impl RangeBounds<usize>) -> Vec<T> {
        slice_range(&self.source.get(), range)
    }

    pub(crate) fn source_len(&self) -> usize {
        self.source.get().len()
    }

    pub(crate) fn published(&self, range: impl RangeBounds<usize>) -> Vec<T> {
        slice_range(&self.published.get(), range)
    }

    pub(crate) fn published_all(&self) -> Vec<T> {
        self.published.get()
    }

    pub(crate) fn published_len(&self) -> usize {
        self.published.get().len()
    }

    /// Reset source and published view together.
    pub(crate) fn clear(&self) {
        self.source.set(Vec::new());
        self.published.set(Vec::new());
    }

    pub(crate) fn changed_times(&self) -> u64 {
        self.changed.get()
    }

    pub(crate) fn changed_signal(&self) -> Signal<u64> {
        self.changed.clone()
    }

    pub(crate) fn add_filter(&self, filter: FilterPolicy<T>) {
        self.policies.borrow_mut().add_filter(filter);
    }

    pub(crate) fn clear_filters(&self) {
        self.policies.borrow_mut().clear_filters();
    }

    pub(crate) fn set_sort(&self, sort: SortPolicy<T>) {
        self.policies.borrow_mut().set_sort(sort);
    }

    pub(crate) fn delete_sort(&self) {
        self.policies.borrow_mut().delete_sort();
    }

    /// Recompute the published view. On failure nothing changes.
    pub(crate) fn try_publish(&self) -> Result<(), RepositoryError> {
        // Policies may touch the repository, so run them on a snapshot.
        let policies = self.policies.borrow().clone();
        let next = policies.apply(self.source.get())?;

        trace!(count = next.len(), "publishing");
        self.published.set(next);
        self.changed.set(self.changed.get() + 1);
        Ok(())
    }

    pub(crate) fn publish(&self) {
        if let Err(err) = self.try_publish() {
            error!(%err, "policy chain aborted, published view unchanged");
        }
    }
}

/// Wrap an infallible filter as a [`FilterPolicy`].
pub(crate) fn infallible<T: 'static>(filter: impl Fn(Vec<T>) -> Vec<T> + 'static) -> FilterPolicy<T> {
    Rc::new(move |items| Ok::<_, PolicyError>(filter(items)))
}

pub(crate) fn fallible<T: 'static>(
    filter: impl Fn(Vec<T>) -> Result<Vec<T>, PolicyError> + 'static,
) -> FilterPolicy<T> {
    Rc::new(filter)
}

pub(crate) fn comparator<T: 'static>(compare: impl Fn(&T, &T) -> Ordering + 'static) -> SortPolicy<T> {
    Rc::new(compare)
}

/// Copy of `items[range]`, clamped to the slice.
fn slice_range<T: Clone>(items: &[T], range: impl RangeBounds<usize>) -> Vec<T> {
    let len = items.len();
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    }
    .min(len);
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    }
    .min(len);

    if start >= end {
        return Vec::new();
    }
    items[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_range_clamps() {
        let items = [1, 2, 3, 4];
        assert_eq!(slice_range(&items, ..), vec![1, 2, 3, 4]);
        assert_eq!(slice_range(&items, 1..3), vec![2, 3]);
        assert_eq!(slice_range(&items, 2..), vec![3, 4]);
        assert_eq!(slice_range(&items, ..=1), vec![1, 2]);
        assert_eq!(slice_range(&items, 3..10), vec![4]);
        assert!(slice_range(&items, 5..).is_empty());
        assert!(slice_range(&items, 3..1).is_empty());
    }

    #[test]
    fn test_pipeline_counts_each_publication() {
        let pipeline = Pipeline::<i32>::new();
        pipeline.add_source([3, 1, 2]);
        assert_eq!(pipeline.changed_times(), 0);
        assert_eq!(pipeline.published_len(), 0);

        pipeline.set_sort(comparator(|a: &i32, b: &i32| a.cmp(b)));
        pipeline.publish();
        pipeline.publish();
        assert_eq!(pipeline.changed_times(), 2);
        assert_eq!(pipeline.published(..), vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_may_mutate_policies_while_running() {
        let pipeline = Rc::new(Pipeline::<i32>::new());
        pipeline.add_source([1, 2]);

        let inner = pipeline.clone();
        pipeline.add_filter(infallible(move |items: Vec<i32>| {
            inner.delete_sort();
            items
        }));
        pipeline.publish();
        assert_eq!(pipeline.changed_times(), 1);
    }
}
