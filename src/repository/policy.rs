//! Publication policies.
//!
//! A repository publishes `sort(filter_n(...filter_1(copy(source))))`.
//! Filters run in insertion order and may fail. The chain is
//! all-or-nothing: one failing filter aborts the whole publication.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::error::{PolicyError, RepositoryError};

/// Fallible filter stage.
pub type FilterPolicy<T> = Rc<dyn Fn(Vec<T>) -> Result<Vec<T>, PolicyError>>;

/// Comparator used by the final sort stage.
pub type SortPolicy<T> = Rc<dyn Fn(&T, &T) -> Ordering>;

/// Ordered filter chain plus at most one comparator.
pub struct PolicySet<T> {
    filters: Vec<FilterPolicy<T>>,
    sort: Option<SortPolicy<T>>,
}

impl<T> Default for PolicySet<T> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: None,
        }
    }
}

impl<T> Clone for PolicySet<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            sort: self.sort.clone(),
        }
    }
}

impl<T> PolicySet<T> {
    pub fn add_filter(&mut self, filter: FilterPolicy<T>) {
        self.filters.push(filter);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn set_sort(&mut self, sort: SortPolicy<T>) {
        self.sort = Some(sort);
    }

    pub fn delete_sort(&mut self) {
        self.sort = None;
    }

    pub fn has_sort(&self) -> bool {
        self.sort.is_some()
    }

    /// Run the chain over `items`.
    ///
    /// Filters are skipped for an empty input, the sort for fewer than two
    /// items. The sort is stable.
    pub fn apply(&self, mut items: Vec<T>) -> Result<Vec<T>, RepositoryError> {
        if !items.is_empty() {
            for (stage, filter) in self.filters.iter().enumerate() {
                items = filter(items).map_err(|source| RepositoryError::Filter { stage, source })?;
            }
        }

        if let Some(sort) = &self.sort {
            if items.len() > 1 {
                items.sort_by(|a, b| sort(a, b));
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evens() -> FilterPolicy<i32> {
        Rc::new(|items: Vec<i32>| -> Result<Vec<i32>, PolicyError> {
            Ok(items.into_iter().filter(|n| n % 2 == 0).collect())
        })
    }

    #[test]
    fn test_filters_run_in_order_then_sort() {
        let mut policies = PolicySet::default();
        policies.add_filter(evens());
        policies.add_filter(Rc::new(|items: Vec<i32>| -> Result<Vec<i32>, PolicyError> {
            Ok(items.into_iter().take(2).collect())
        }));
        policies.set_sort(Rc::new(|a: &i32, b: &i32| b.cmp(a)));

        assert_eq!(policies.apply(vec![1, 2, 3, 4, 6]).unwrap(), vec![4, 2]);
    }

    #[test]
    fn test_failure_reports_stage() {
        let mut policies = PolicySet::default();
        policies.add_filter(evens());
        policies.add_filter(Rc::new(|_: Vec<i32>| -> Result<Vec<i32>, PolicyError> {
            Err(PolicyError::new("boom"))
        }));

        let err = policies.apply(vec![2]).unwrap_err();
        assert_eq!(
            err,
            RepositoryError::Filter {
                stage: 1,
                source: PolicyError::new("boom")
            }
        );
        assert_eq!(err.to_string(), "filter policy #1 failed: boom");
    }

    #[test]
    fn test_empty_input_skips_filters() {
        let mut policies = PolicySet::default();
        policies.add_filter(Rc::new(|_: Vec<i32>| -> Result<Vec<i32>, PolicyError> {
            Err(PolicyError::new("never called"))
        }));
        assert_eq!(policies.apply(Vec::new()).unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut policies = PolicySet::default();
        policies.set_sort(Rc::new(|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0)));

        let sorted = policies.apply(vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')]).unwrap();
        assert_eq!(sorted, vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);

        policies.delete_sort();
        assert!(!policies.has_sort());
    }
}
