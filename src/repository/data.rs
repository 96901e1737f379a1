//! Data repository - working records published on demand.

use std::cmp::Ordering;
use std::ops::RangeBounds;
use std::rc::Rc;

use spark_signals::Signal;

use super::{comparator, fallible, infallible, Pipeline};
use crate::error::{PolicyError, RepositoryError};

/// Shared handle to a data repository.
pub struct DataRepository<T: Clone + PartialEq + 'static> {
    pipeline: Rc<Pipeline<T>>,
}

impl<T: Clone + PartialEq + 'static> Clone for DataRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Default for DataRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + 'static> DataRepository<T> {
    pub fn new() -> Self {
        Self {
            pipeline: Rc::new(Pipeline::new()),
        }
    }

    pub fn add_source(&self, items: impl IntoIterator<Item = T>) -> &Self {
        self.pipeline.add_source(items);
        self
    }

    pub fn get_source(&self, range: impl RangeBounds<usize>) -> Vec<T> {
        self.pipeline.source(range)
    }

    pub fn get_source_length(&self) -> usize {
        self.pipeline.source_len()
    }

    pub fn clear(&self) -> &Self {
        self.pipeline.clear();
        self
    }

    pub fn add_filter_policy(&self, filter: impl Fn(Vec<T>) -> Vec<T> + 'static) -> &Self {
        self.pipeline.add_filter(infallible(filter));
        self
    }

    pub fn add_fallible_filter_policy(
        &self,
        filter: impl Fn(Vec<T>) -> Result<Vec<T>, PolicyError> + 'static,
    ) -> &Self {
        self.pipeline.add_filter(fallible(filter));
        self
    }

    pub fn clear_filter_policies(&self) -> &Self {
        self.pipeline.clear_filters();
        self
    }

    pub fn set_sort_policy(&self, compare: impl Fn(&T, &T) -> Ordering + 'static) -> &Self {
        self.pipeline.set_sort(comparator(compare));
        self
    }

    pub fn delete_sort_policy(&self) -> &Self {
        self.pipeline.delete_sort();
        self
    }

    pub fn apply_policies(&self) -> &Self {
        self.pipeline.publish();
        self
    }

    pub fn try_apply_policies(&self) -> Result<(), RepositoryError> {
        self.pipeline.try_publish()
    }

    pub fn get_data(&self, range: impl RangeBounds<usize>) -> Vec<T> {
        self.pipeline.published(range)
    }

    pub fn get_data_length(&self) -> usize {
        self.pipeline.published_len()
    }

    pub fn get_changed_times(&self) -> u64 {
        self.pipeline.changed_times()
    }

    pub fn changed_signal(&self) -> Signal<u64> {
        self.pipeline.changed_signal()
    }
}
