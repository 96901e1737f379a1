//! Resource - Base reactive entity.
//!
//! Every view-model in the framework carries three independent flags:
//! - `available` (default true) - participates in interaction
//! - `valid` (default false) - holds a committed, non-empty value
//! - `visible` (default true) - should be rendered
//!
//! Each flag is a signal. The paired operations only write when the flag
//! actually changes, so subscribers observe transitions, not levels.
//!
//! # Example
//!
//! ```ignore
//! use spark_forms::Resource;
//! use spark_signals::effect;
//!
//! let resource = Resource::new();
//! let visible = resource.visible_signal();
//! let _e = effect(move || println!("visible: {}", visible.get()));
//!
//! resource.hide(); // prints once
//! resource.hide(); // no-op
//! ```

use spark_signals::{signal, Signal};

use crate::types::ResourceState;

/// Write `value` into `flag` only if it differs. Returns true on change.
pub(crate) fn set_flag(flag: &Signal<bool>, value: bool) -> bool {
    if flag.get() == value {
        return false;
    }
    flag.set(value);
    true
}

/// Reactive available/valid/visible flags.
///
/// Cloning shares the underlying signals.
#[derive(Clone)]
pub struct Resource {
    available: Signal<bool>,
    valid: Signal<bool>,
    visible: Signal<bool>,
}

impl Default for Resource {
    fn default() -> Self {
        Self::new()
    }
}

impl Resource {
    pub fn new() -> Self {
        Self {
            available: signal(true),
            valid: signal(false),
            visible: signal(true),
        }
    }

    // =========================================================================
    // Availability
    // =========================================================================

    pub fn is_available(&self) -> bool {
        self.available.get()
    }

    pub fn enable(&self) -> &Self {
        set_flag(&self.available, true);
        self
    }

    pub fn disable(&self) -> &Self {
        set_flag(&self.available, false);
        self
    }

    pub fn available_signal(&self) -> Signal<bool> {
        self.available.clone()
    }

    // =========================================================================
    // Validity
    // =========================================================================

    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    pub fn validate(&self) -> &Self {
        set_flag(&self.valid, true);
        self
    }

    pub fn invalidate(&self) -> &Self {
        set_flag(&self.valid, false);
        self
    }

    pub fn valid_signal(&self) -> Signal<bool> {
        self.valid.clone()
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn show(&self) -> &Self {
        set_flag(&self.visible, true);
        self
    }

    pub fn hide(&self) -> &Self {
        set_flag(&self.visible, false);
        self
    }

    pub fn visible_signal(&self) -> Signal<bool> {
        self.visible.clone()
    }

    /// Snapshot of all three flags.
    pub fn state(&self) -> ResourceState {
        let mut state = ResourceState::NONE;
        state.set(ResourceState::AVAILABLE, self.is_available());
        state.set(ResourceState::VALID, self.is_valid());
        state.set(ResourceState::VISIBLE, self.is_visible());
        state
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::effect;
    use std::cell::Cell;
    use std::rc::Rc;

    fn count_changes(flag: Signal<bool>) -> (Rc<Cell<usize>>, impl Sized) {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let handle = effect(move || {
            let _ = flag.get();
            counter.set(counter.get() + 1);
        });
        (runs, handle)
    }

    #[test]
    fn test_defaults() {
        let resource = Resource::new();
        assert!(resource.is_available());
        assert!(!resource.is_valid());
        assert!(resource.is_visible());
        assert_eq!(
            resource.state(),
            ResourceState::AVAILABLE | ResourceState::VISIBLE
        );
    }

    #[test]
    fn test_show_is_idempotent() {
        let resource = Resource::new();
        let (runs, _e) = count_changes(resource.visible_signal());
        assert_eq!(runs.get(), 1);

        resource.show();
        assert_eq!(runs.get(), 1);

        resource.hide();
        resource.hide();
        assert_eq!(runs.get(), 2);

        resource.show();
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_enable_and_validate_are_idempotent() {
        let resource = Resource::new();
        let (available_runs, _e1) = count_changes(resource.available_signal());
        let (valid_runs, _e2) = count_changes(resource.valid_signal());

        resource.enable();
        resource.invalidate();
        assert_eq!(available_runs.get(), 1);
        assert_eq!(valid_runs.get(), 1);

        resource.disable().disable();
        resource.validate().validate();
        assert_eq!(available_runs.get(), 2);
        assert_eq!(valid_runs.get(), 2);
    }

    #[test]
    fn test_flags_are_independent() {
        let resource = Resource::new();
        resource.validate();
        resource.hide();
        assert!(resource.is_available());
        assert!(resource.is_valid());
        assert!(!resource.is_visible());

        resource.disable();
        assert_eq!(resource.state(), ResourceState::VALID);
    }

    #[test]
    fn test_clones_share_state() {
        let resource = Resource::new();
        let other = resource.clone();
        other.validate();
        assert!(resource.is_valid());
    }
}
