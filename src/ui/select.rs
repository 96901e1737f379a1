//! Option collections - select box, check box, radio button.
//!
//! A collection owns an ordered list of option nodes. Each option carries a
//! fixed option value and becomes checked (and valid) only when exactly that
//! value is written through it. Writes to the collection are mapped onto
//! option writes:
//!
//! - RadioButton / SelectBox - the first option whose value matches is
//!   checked, every other option is cleared
//! - CheckBox - the written value is split on the delimiter and every
//!   listed option is checked
//!
//! Collection validity is an OR over the options.
//!
//! Options know their collection. Checking an option of a RadioButton or
//! SelectBox directly clears its siblings, and a SelectBox follows the
//! option into its own value.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::{debug, warn};

use super::{NodeInner, NodeKind, OptionSpec, UiNode, UiProps};
use crate::error::StructureError;
use crate::resource::set_flag;

/// Joins checked captions in `output()` and checked values in `value()`.
pub(super) const OUTPUT_DELIMITER: &str = ", ";

// =============================================================================
// Option State
// =============================================================================

pub(super) struct OptionState {
    value: String,
    checked: Signal<bool>,
    collection: RefCell<Weak<NodeInner>>,
}

impl OptionState {
    /// Check on an exact match, clear on anything else. Returns whether the
    /// option ended up checked.
    fn apply(&self, node: &UiNode, value: String) -> bool {
        if !value.is_empty() && value == self.value {
            node.inner.cached.set(value);
            set_flag(&self.checked, true);
            node.inner.resource.validate();
            true
        } else {
            node.inner.cached.set(String::new());
            set_flag(&self.checked, false);
            node.inner.resource.invalidate();
            false
        }
    }

    /// Direct write on the option, kept consistent with its collection.
    pub(super) fn write(&self, node: &UiNode, value: String) {
        let checked = self.apply(node, value);

        let Some(inner) = self.collection.borrow().upgrade() else {
            return;
        };
        let collection = UiNode { inner };

        match &collection.inner.kind {
            NodeKind::RadioButton(c) if checked => c.clear_except(node),
            NodeKind::SelectBox(c) if checked => {
                c.clear_except(node);
                collection.write_cached(self.value.clone());
            }
            NodeKind::SelectBox(_) if collection.inner.cached.get() == self.value => {
                collection.write_cached(String::new());
            }
            _ => {}
        }
    }
}

// =============================================================================
// Collection State
// =============================================================================

pub(super) struct Collection {
    pub(super) options: Signal<Vec<UiNode>>,
    pub(super) delimiter: String,
}

impl Collection {
    fn new() -> Self {
        Self {
            options: signal(Vec::new()),
            delimiter: OUTPUT_DELIMITER.to_string(),
        }
    }

    pub(super) fn checked_values(&self) -> Vec<String> {
        self.options
            .get()
            .iter()
            .filter(|o| o.is_valid())
            .map(UiNode::value)
            .collect()
    }

    pub(super) fn checked_captions(&self) -> Vec<String> {
        self.options
            .get()
            .iter()
            .filter(|o| o.is_valid())
            .map(|o| o.caption().to_string())
            .collect()
    }

    /// Caption of the option carrying `value`.
    pub(super) fn caption_of(&self, value: &str) -> Option<String> {
        self.options
            .get()
            .iter()
            .find(|o| o.option_value() == Some(value))
            .map(|o| o.caption().to_string())
    }

    /// Check the first option matching `value`, clear all others.
    pub(super) fn write_exclusive(&self, value: &str) {
        let mut matched = false;
        for option in self.options.get() {
            if !matched && !value.is_empty() && option.option_value() == Some(value) {
                option.apply_option(value.to_string());
                matched = true;
            } else {
                option.apply_option(String::new());
            }
        }
    }

    /// Check every option listed in the delimited `value`.
    ///
    /// Items are trimmed, so `"x,z"` and `"x, z"` check the same options.
    pub(super) fn write_subset(&self, value: &str) {
        let separator = match self.delimiter.trim() {
            "" => self.delimiter.as_str(),
            trimmed => trimmed,
        };
        let wanted: Vec<&str> = value
            .split(separator)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();

        for option in self.options.get() {
            match option.option_value() {
                Some(v) if wanted.contains(&v) => {
                    let v = v.to_string();
                    option.apply_option(v);
                }
                _ => option.apply_option(String::new()),
            }
        }
    }

    fn clear_except(&self, keep: &UiNode) {
        for option in self.options.get() {
            if option != *keep {
                option.apply_option(String::new());
            }
        }
    }
}

// =============================================================================
// Constructors and Option API
// =============================================================================

impl UiNode {
    /// Single option. Fails on an empty option value, which could never be
    /// checked.
    pub fn try_option(props: UiProps, value: impl Into<String>) -> Result<UiNode, StructureError> {
        let value = value.into();
        if value.is_empty() {
            return Err(StructureError::EmptyOptionValue {
                caption: props.caption,
            });
        }

        Ok(UiNode::build(
            props,
            NodeKind::Option(OptionState {
                value,
                checked: signal(false),
                collection: RefCell::new(Weak::new()),
            }),
        ))
    }

    /// Single-choice drop-down. Keeps its own value and mirrors the
    /// selection into its options.
    pub fn select_box(props: UiProps, options: &[OptionSpec]) -> Self {
        Self::collection(props, options, NodeKind::SelectBox)
    }

    /// Multiple-choice collection.
    pub fn check_box(props: UiProps, options: &[OptionSpec]) -> Self {
        Self::collection(props, options, NodeKind::CheckBox)
    }

    /// Mutually exclusive collection.
    pub fn radio_button(props: UiProps, options: &[OptionSpec]) -> Self {
        Self::collection(props, options, NodeKind::RadioButton)
    }

    fn collection(props: UiProps, specs: &[OptionSpec], kind: fn(Collection) -> NodeKind) -> Self {
        let node = UiNode::build(props, kind(Collection::new()));
        node.set_options(specs);
        node
    }

    fn collection_state(&self) -> Option<&Collection> {
        match &self.inner.kind {
            NodeKind::SelectBox(c) | NodeKind::CheckBox(c) | NodeKind::RadioButton(c) => Some(c),
            _ => None,
        }
    }

    /// Options of a collection, empty for other kinds.
    pub fn options(&self) -> Vec<UiNode> {
        self.collection_state()
            .map(|c| c.options.get())
            .unwrap_or_default()
    }

    /// Replace the options with fresh nodes built from `specs`.
    ///
    /// New options inherit the collection's write/copy restrictions. Specs
    /// with an empty value are skipped.
    pub fn set_options(&self, specs: &[OptionSpec]) -> &Self {
        let Some(collection) = self.collection_state() else {
            debug!(node = %self.name(), kind = ?self.kind(), "set_options ignored: not a collection");
            return self;
        };

        let options: Vec<UiNode> = specs
            .iter()
            .filter_map(|spec| {
                match UiNode::try_option(UiProps::new(&spec.caption, &spec.name), &spec.value) {
                    Ok(option) => Some(option),
                    Err(err) => {
                        warn!(node = %self.name(), %err, "option skipped");
                        None
                    }
                }
            })
            .collect();

        for option in &options {
            self.adopt(option);
            if let NodeKind::Option(state) = &option.inner.kind {
                *state.collection.borrow_mut() = Rc::downgrade(&self.inner);
            }
        }
        collection.options.set(options);

        if let NodeKind::SelectBox(c) = &self.inner.kind {
            c.write_exclusive(&self.value());
        }
        self
    }

    /// Fixed candidate value of an option.
    pub fn option_value(&self) -> Option<&str> {
        match &self.inner.kind {
            NodeKind::Option(option) => Some(option.value.as_str()),
            _ => None,
        }
    }

    pub fn is_checked(&self) -> bool {
        match &self.inner.kind {
            NodeKind::Option(option) => option.checked.get(),
            _ => false,
        }
    }

    /// Write the option's own value through it.
    pub fn check(&self) -> &Self {
        if let Some(value) = self.option_value() {
            let value = value.to_string();
            self.set_value(value);
        }
        self
    }

    pub fn uncheck(&self) -> &Self {
        if self.option_value().is_some() {
            self.set_value("");
        }
        self
    }

    /// Write an option without touching its collection.
    fn apply_option(&self, value: String) {
        if let NodeKind::Option(state) = &self.inner.kind {
            state.apply(self, value);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::UiKind;

    fn xyz() -> Vec<OptionSpec> {
        vec![
            OptionSpec::new("Ex", "x"),
            OptionSpec::new("Why", "y"),
            OptionSpec::new("Zed", "z"),
        ]
    }

    #[test]
    fn test_option_checks_only_on_exact_value() {
        let option = UiNode::try_option(UiProps::new("Yes", "AGREE"), "1").unwrap();
        assert_eq!(option.kind(), UiKind::Option);

        option.set_value("2");
        assert!(!option.is_checked());
        assert!(!option.is_valid());

        option.set_value("1");
        assert!(option.is_checked());
        assert_eq!(option.value(), "1");
        assert_eq!(option.output(), "Yes");

        option.uncheck();
        assert!(!option.is_valid());
        assert_eq!(option.to_text(), "Yes");
    }

    #[test]
    fn test_empty_option_value_is_a_structure_error() {
        let err = UiNode::try_option(UiProps::new("Broken", ""), "").unwrap_err();
        assert_eq!(
            err,
            StructureError::EmptyOptionValue {
                caption: "Broken".to_string()
            }
        );

        let select = UiNode::select_box(
            UiProps::new("S", "S"),
            &[OptionSpec::new("Broken", ""), OptionSpec::new("Ok", "1")],
        );
        assert_eq!(select.options().len(), 1);
    }

    #[test]
    fn test_check_box_scenario() {
        let check = UiNode::check_box(UiProps::new("Letters", "LETTERS"), &xyz());
        assert!(!check.is_valid());
        assert_eq!(check.output(), "");

        let options = check.options();
        options[0].check();
        options[2].check();

        assert!(check.is_valid());
        assert_eq!(check.output(), "Ex, Zed");
        assert_eq!(check.value(), "x, z");
    }

    #[test]
    fn test_check_box_write_maps_to_subset() {
        let check = UiNode::check_box(UiProps::new("Letters", "LETTERS"), &xyz());
        check.set_value("y, z");

        let checked: Vec<bool> = check.options().iter().map(UiNode::is_checked).collect();
        assert_eq!(checked, vec![false, true, true]);

        check.set_value("");
        assert!(!check.is_valid());
    }

    #[test]
    fn test_radio_exclusivity() {
        let radio = UiNode::radio_button(UiProps::new("Size", "SIZE"), &xyz());
        let options = radio.options();

        radio.set_value("x");
        radio.set_value("z");

        let valid: Vec<bool> = options.iter().map(UiNode::is_valid).collect();
        assert_eq!(valid, vec![false, false, true]);
        assert_eq!(radio.value(), "z");
        assert_eq!(radio.output(), "Zed");

        radio.set_value("nope");
        assert!(!radio.is_valid());
    }

    #[test]
    fn test_radio_direct_check_clears_siblings() {
        let radio = UiNode::radio_button(UiProps::new("Size", "SIZE"), &xyz());
        let options = radio.options();

        options[0].check();
        options[2].check();

        let valid: Vec<bool> = options.iter().map(UiNode::is_valid).collect();
        assert_eq!(valid, vec![false, false, true]);
        assert_eq!(radio.value(), "z");
        assert_eq!(radio.output(), "Zed");

        options[2].uncheck();
        assert!(!radio.is_valid());
    }

    #[test]
    fn test_select_box_follows_direct_option_writes() {
        let select = UiNode::select_box(UiProps::new("Letter", "LETTER"), &xyz());
        let options = select.options();
        select.set_value("x");

        options[1].check();
        assert_eq!(select.value(), "y");
        assert_eq!(select.output(), "Why");
        assert!(!options[0].is_checked());

        // Unchecking an option the select does not hold leaves it alone
        options[0].uncheck();
        assert_eq!(select.value(), "y");

        options[1].uncheck();
        assert_eq!(select.value(), "");
        assert!(!select.is_valid());
    }

    #[test]
    fn test_check_box_direct_checks_are_independent() {
        let check = UiNode::check_box(UiProps::new("Letters", "LETTERS"), &xyz());
        let options = check.options();
        options[0].check();
        options[1].check();

        assert_eq!(check.value(), "x, y");
    }

    #[test]
    fn test_check_box_write_tolerates_spacing() {
        let check = UiNode::check_box(UiProps::new("Letters", "LETTERS"), &xyz());
        check.set_value("x,z");

        let checked: Vec<bool> = check.options().iter().map(UiNode::is_checked).collect();
        assert_eq!(checked, vec![true, false, true]);

        check.set_value(" y ,  z");
        assert_eq!(check.value(), "y, z");
    }

    #[test]
    fn test_radio_duplicate_values_check_first_only() {
        let radio = UiNode::radio_button(
            UiProps::new("Dup", "DUP"),
            &[OptionSpec::new("One", "1"), OptionSpec::new("Uno", "1")],
        );
        radio.set_value("1");

        let valid: Vec<bool> = radio.options().iter().map(UiNode::is_valid).collect();
        assert_eq!(valid, vec![true, false]);
    }

    #[test]
    fn test_select_box_output_is_matching_caption() {
        let select = UiNode::select_box(UiProps::new("Letter", "LETTER"), &xyz());
        select.set_value("y");

        assert_eq!(select.value(), "y");
        assert_eq!(select.output(), "Why");
        assert!(select.options()[1].is_checked());

        // Unknown values are kept but have no caption
        select.set_value("q");
        assert!(select.is_valid());
        assert_eq!(select.output(), "");
        assert!(select.options().iter().all(|o| !o.is_checked()));
    }

    #[test]
    fn test_select_box_keeps_selection_across_new_options() {
        let select = UiNode::select_box(UiProps::new("Letter", "LETTER"), &xyz());
        select.set_value("z");

        select.set_options(&[OptionSpec::new("Zulu", "z"), OptionSpec::new("Alpha", "a")]);
        assert_eq!(select.output(), "Zulu");
        assert!(select.options()[0].is_checked());
    }

    #[test]
    fn test_write_restrictions_cascade_to_current_and_future_options() {
        let props = UiProps {
            read_only: true,
            copyable: false,
            ..UiProps::new("Size", "SIZE")
        };
        let radio = UiNode::radio_button(props, &xyz());
        assert!(radio.options().iter().all(|o| !o.is_writable() && !o.is_copyable()));

        radio.permit_write();
        assert!(radio.options().iter().all(UiNode::is_writable));

        radio.forbid_write();
        radio.set_options(&[OptionSpec::new("New", "n")]);
        assert!(!radio.options()[0].is_writable());
        assert!(!radio.options()[0].is_copyable());
    }

    #[test]
    fn test_clear_respects_option_writability() {
        let check = UiNode::check_box(UiProps::new("Letters", "LETTERS"), &xyz());
        check.set_value("x, y");

        check.options()[0].forbid_write();
        check.clear();
        // Collection-level clear rewrites through value, reaching every option
        assert!(!check.is_valid());

        check.set_value("x");
        check.forbid_write();
        check.clear();
        assert_eq!(check.value(), "x");

        check.reset();
        assert_eq!(check.value(), "");
    }

    #[test]
    fn test_get_by_name_reaches_options() {
        let check = UiNode::check_box(
            UiProps::new("Colors", "COLORS"),
            &[
                OptionSpec::new("Red", "1").named("RED"),
                OptionSpec::new("Blue", "1").named("BLUE"),
            ],
        );

        let found = check.get_by_name(&["BLUE", "COLORS"]);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], check);
        assert_eq!(found[1].caption(), "Blue");
    }

    #[test]
    fn test_option_specs_are_not_shared() {
        let specs = xyz();
        let a = UiNode::radio_button(UiProps::new("A", "A"), &specs);
        let b = UiNode::radio_button(UiProps::new("B", "B"), &specs);

        a.set_value("x");
        assert!(a.is_valid());
        assert!(!b.is_valid());
        assert_ne!(a.options()[0], b.options()[0]);
    }
}
