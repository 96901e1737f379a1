//! UI Nodes - Reactive form-control view-models.
//!
//! A [`UiNode`] is a shared handle to one form field: a caption, a wire
//! name, a [`Resource`] (available/valid/visible), writable and copyable
//! flags, and a string value cell that is the single source of truth.
//!
//! # Node kinds
//!
//! Behaviour that differs between controls is selected at construction from
//! a closed set ([`UiKind`]):
//!
//! - `Text` / `Date` - leaf fields. Date reformats its stored value for display.
//! - `DateRange` - a begin and an end date edited as one `begin-end` value.
//! - `Option` - one selectable candidate with a fixed option value.
//! - `SelectBox` / `CheckBox` / `RadioButton` - collections of options.
//! - `List` - delimiter-separated items, each held by an anonymous element.
//! - `Group` - presentation-only container used to build nested trees.
//!
//! # Validity gating
//!
//! Writing a non-empty value validates a leaf, writing an empty one
//! invalidates it. `value()` and `output()` read `""` whenever the node is
//! invalid. Collections, lists, date ranges and groups derive validity from
//! children.
//!
//! # Example
//!
//! ```ignore
//! use spark_forms::ui::UiNode;
//!
//! let name = UiNode::text("Name", "NAME");
//! name.set_value("hello");
//! assert_eq!(name.output(), "hello");
//!
//! name.set_value("");
//! assert!(!name.is_valid());
//! ```

mod list;
mod params;
mod range;
mod select;
mod text;
mod wire;

pub use params::{DateParams, ListParams, OptionSpec, TextParams, UiProps};

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use spark_signals::{signal, Signal};
use tracing::{debug, error};

use crate::error::PolicyError;
use crate::resource::{set_flag, Resource};
use crate::types::ResourceState;

use list::ListState;
use range::RangeState;
use select::{Collection, OptionState};

// =============================================================================
// Node Identity
// =============================================================================

thread_local! {
    /// Counter for node ids (unique per thread).
    static NEXT_NODE_ID: Cell<u64> = const { Cell::new(0) };
}

fn next_node_id() -> u64 {
    NEXT_NODE_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    })
}

// =============================================================================
// Node Kind
// =============================================================================

/// Public tag of a node's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiKind {
    Text,
    Date,
    DateRange,
    Option,
    SelectBox,
    CheckBox,
    RadioButton,
    List,
    Group,
}

enum NodeKind {
    Text(TextParams),
    Date(DateParams),
    DateRange(RangeState),
    Option(OptionState),
    SelectBox(Collection),
    CheckBox(Collection),
    RadioButton(Collection),
    List(ListState),
    Group(Signal<Vec<UiNode>>),
}

/// Setter/getter applied by `serialize` and `deserialize`.
pub type NodeCallback<'a> = &'a dyn Fn(&UiNode) -> Result<(), PolicyError>;

// =============================================================================
// UiNode
// =============================================================================

struct NodeInner {
    id: u64,
    caption: String,
    name: String,
    prefix: String,
    suffix: String,
    resource: Resource,
    writable: Signal<bool>,
    copyable: Signal<bool>,
    cached: Signal<String>,
    previous: Signal<String>,
    kind: NodeKind,
}

/// Shared handle to a reactive form-control view-model.
///
/// Cloning is cheap and yields the same node. Equality is identity.
#[derive(Clone)]
pub struct UiNode {
    inner: Rc<NodeInner>,
}

impl PartialEq for UiNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for UiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiNode")
            .field("id", &self.inner.id)
            .field("kind", &self.kind())
            .field("name", &self.inner.name)
            .field("value", &self.inner.cached.get())
            .finish()
    }
}

impl UiNode {
    fn build(props: UiProps, kind: NodeKind) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                id: next_node_id(),
                caption: props.caption,
                name: props.name,
                prefix: props.prefix,
                suffix: props.suffix,
                resource: Resource::new(),
                writable: signal(!props.read_only),
                copyable: signal(props.copyable),
                cached: signal(String::new()),
                previous: signal(String::new()),
                kind,
            }),
        }
    }

    /// Plain text field.
    pub fn text(caption: impl Into<String>, name: impl Into<String>) -> Self {
        Self::text_with(UiProps::new(caption, name), TextParams::default())
    }

    pub fn text_with(props: UiProps, params: TextParams) -> Self {
        Self::build(props, NodeKind::Text(params))
    }

    /// Date field storing `YYYY/MM/DD`.
    pub fn date(caption: impl Into<String>, name: impl Into<String>) -> Self {
        Self::date_with(UiProps::new(caption, name), DateParams::default())
    }

    pub fn date_with(props: UiProps, params: DateParams) -> Self {
        Self::build(props, NodeKind::Date(params))
    }

    /// Presentation-only container.
    pub fn group(props: UiProps, children: Vec<UiNode>) -> Self {
        let node = Self::build(props, NodeKind::Group(signal(Vec::new())));
        for child in children {
            node.push_child(child);
        }
        node
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn caption(&self) -> &str {
        &self.inner.caption
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.inner.suffix
    }

    pub fn kind(&self) -> UiKind {
        match &self.inner.kind {
            NodeKind::Text(_) => UiKind::Text,
            NodeKind::Date(_) => UiKind::Date,
            NodeKind::DateRange(_) => UiKind::DateRange,
            NodeKind::Option(_) => UiKind::Option,
            NodeKind::SelectBox(_) => UiKind::SelectBox,
            NodeKind::CheckBox(_) => UiKind::CheckBox,
            NodeKind::RadioButton(_) => UiKind::RadioButton,
            NodeKind::List(_) => UiKind::List,
            NodeKind::Group(_) => UiKind::Group,
        }
    }

    /// Whether validity is derived from children rather than stored.
    fn has_derived_validity(&self) -> bool {
        matches!(
            self.inner.kind,
            NodeKind::CheckBox(_)
                | NodeKind::RadioButton(_)
                | NodeKind::List(_)
                | NodeKind::DateRange(_)
                | NodeKind::Group(_)
        )
    }

    // =========================================================================
    // Resource Flags
    // =========================================================================

    pub fn resource(&self) -> &Resource {
        &self.inner.resource
    }

    pub fn is_available(&self) -> bool {
        self.inner.resource.is_available()
    }

    pub fn enable(&self) -> &Self {
        self.inner.resource.enable();
        self
    }

    pub fn disable(&self) -> &Self {
        self.inner.resource.disable();
        self
    }

    pub fn is_visible(&self) -> bool {
        self.inner.resource.is_visible()
    }

    pub fn show(&self) -> &Self {
        self.inner.resource.show();
        self
    }

    pub fn hide(&self) -> &Self {
        self.inner.resource.hide();
        self
    }

    pub fn is_valid(&self) -> bool {
        match &self.inner.kind {
            NodeKind::CheckBox(c) | NodeKind::RadioButton(c) => {
                c.options.get().iter().any(UiNode::is_valid)
            }
            NodeKind::List(l) => l.elements.get().iter().any(UiNode::is_valid),
            NodeKind::DateRange(r) => r.is_valid(),
            NodeKind::Group(children) => children.get().iter().any(UiNode::is_valid),
            _ => self.inner.resource.is_valid(),
        }
    }

    /// Force the valid flag on. Ignored by kinds with derived validity.
    pub fn validate(&self) -> &Self {
        if !self.has_derived_validity() {
            self.inner.resource.validate();
        }
        self
    }

    /// Force the valid flag off. Ignored by kinds with derived validity.
    pub fn invalidate(&self) -> &Self {
        if !self.has_derived_validity() {
            self.inner.resource.invalidate();
        }
        self
    }

    /// Snapshot of available/valid/visible, using derived validity.
    pub fn state(&self) -> ResourceState {
        let mut state = self.inner.resource.state();
        state.set(ResourceState::VALID, self.is_valid());
        state
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    pub fn is_writable(&self) -> bool {
        self.inner.writable.get()
    }

    pub fn writable_signal(&self) -> Signal<bool> {
        self.inner.writable.clone()
    }

    /// Permit writes on this node, then on every child.
    pub fn permit_write(&self) -> &Self {
        set_flag(&self.inner.writable, true);
        for child in self.children() {
            child.permit_write();
        }
        self
    }

    /// Forbid writes on this node, then on every child.
    pub fn forbid_write(&self) -> &Self {
        set_flag(&self.inner.writable, false);
        for child in self.children() {
            child.forbid_write();
        }
        self
    }

    pub fn is_copyable(&self) -> bool {
        self.inner.copyable.get()
    }

    pub fn permit_copy(&self) -> &Self {
        set_flag(&self.inner.copyable, true);
        for child in self.children() {
            child.permit_copy();
        }
        self
    }

    pub fn forbid_copy(&self) -> &Self {
        set_flag(&self.inner.copyable, false);
        for child in self.children() {
            child.forbid_copy();
        }
        self
    }

    /// Apply this node's write/copy restrictions to a new child.
    fn adopt(&self, child: &UiNode) {
        if !self.is_writable() {
            child.forbid_write();
        }
        if !self.is_copyable() {
            child.forbid_copy();
        }
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Direct children in tree order: options of a collection, the two
    /// dates of a range or members of a group. List elements are not
    /// children.
    pub fn children(&self) -> Vec<UiNode> {
        match &self.inner.kind {
            NodeKind::SelectBox(c) | NodeKind::CheckBox(c) | NodeKind::RadioButton(c) => {
                c.options.get()
            }
            NodeKind::DateRange(r) => vec![r.begin.clone(), r.end.clone()],
            NodeKind::Group(children) => children.get(),
            _ => Vec::new(),
        }
    }

    /// Append a child to a group.
    pub fn push_child(&self, child: UiNode) -> &Self {
        let NodeKind::Group(children) = &self.inner.kind else {
            debug!(node = %self.name(), kind = ?self.kind(), "push_child ignored: not a group");
            return self;
        };
        if child == *self {
            debug!(node = %self.name(), "push_child ignored: node cannot contain itself");
            return self;
        }

        self.adopt(&child);
        let mut next = children.get();
        next.push(child);
        children.set(next);
        self
    }

    // =========================================================================
    // Value
    // =========================================================================

    /// Current value, `""` while invalid.
    pub fn value(&self) -> String {
        match &self.inner.kind {
            NodeKind::CheckBox(c) => c.checked_values().join(&c.delimiter),
            NodeKind::RadioButton(c) => c.checked_values().into_iter().next().unwrap_or_default(),
            NodeKind::List(l) => l.project(),
            NodeKind::DateRange(r) => r.project(),
            NodeKind::Group(_) => String::new(),
            _ => {
                if self.inner.resource.is_valid() {
                    self.inner.cached.get()
                } else {
                    String::new()
                }
            }
        }
    }

    /// Write through the single value path.
    pub fn set_value(&self, value: impl Into<String>) -> &Self {
        let value = value.into();
        match &self.inner.kind {
            NodeKind::Text(_) | NodeKind::Date(_) => self.write_cached(value),
            NodeKind::Option(option) => option.write(self, value),
            NodeKind::SelectBox(c) => {
                self.write_cached(value.clone());
                c.write_exclusive(&value);
            }
            NodeKind::RadioButton(c) => c.write_exclusive(&value),
            NodeKind::CheckBox(c) => c.write_subset(&value),
            NodeKind::List(l) => l.rebuild(&value),
            NodeKind::DateRange(r) => r.write(&value),
            NodeKind::Group(_) => {
                debug!(node = %self.name(), "set_value ignored: groups carry no value");
            }
        }
        self
    }

    fn write_cached(&self, value: String) {
        let valid = !value.is_empty();
        self.inner.cached.set(value);
        if valid {
            self.inner.resource.validate();
        } else {
            self.inner.resource.invalidate();
        }
    }

    /// Presentation-formatted value, `""` while invalid.
    pub fn output(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }

        match &self.inner.kind {
            NodeKind::Text(_) | NodeKind::List(_) => self.value(),
            NodeKind::Date(params) => text::format_date(&self.value(), params),
            NodeKind::DateRange(r) => r.output(),
            NodeKind::Option(_) => self.inner.caption.clone(),
            NodeKind::SelectBox(c) => c.caption_of(&self.value()).unwrap_or_default(),
            NodeKind::CheckBox(c) | NodeKind::RadioButton(c) => {
                c.checked_captions().join(select::OUTPUT_DELIMITER)
            }
            NodeKind::Group(_) => String::new(),
        }
    }

    /// `"caption:" + prefix + output + suffix`, or just `"caption:"` while
    /// invalid. Options render their bare caption when unchecked.
    pub fn to_text(&self) -> String {
        let decorated = || format!("{}{}{}", self.inner.prefix, self.output(), self.inner.suffix);

        if let NodeKind::Option(_) = self.inner.kind {
            return if self.is_valid() {
                decorated()
            } else {
                self.inner.caption.clone()
            };
        }

        let caption = if self.inner.caption.is_empty() {
            String::new()
        } else {
            format!("{}:", self.inner.caption)
        };

        if !self.is_valid() {
            return caption;
        }
        caption + &decorated()
    }

    // =========================================================================
    // Reset / Clear
    // =========================================================================

    /// Clear the value if valid, regardless of writability, then reset
    /// every child.
    pub fn reset(&self) -> &Self {
        if self.is_valid() {
            self.set_value("");
        }
        for child in self.children() {
            child.reset();
        }
        self
    }

    /// Like `reset`, but refused on read-only nodes. Children apply their
    /// own writability.
    pub fn clear(&self) -> &Self {
        if !self.is_writable() {
            debug!(node = %self.name(), "clear refused: node is read-only");
            return self;
        }
        if self.is_valid() {
            self.set_value("");
        }
        for child in self.children() {
            child.clear();
        }
        self
    }

    // =========================================================================
    // Commit / Rollback
    // =========================================================================

    /// Remember the current value.
    pub fn commit(&self) -> &Self {
        self.inner.previous.set(self.value());
        self
    }

    /// Restore the remembered value.
    pub fn rollback(&self) -> &Self {
        let previous = self.inner.previous.get();
        self.set_value(previous)
    }

    pub fn previous_value(&self) -> String {
        self.inner.previous.get()
    }

    pub fn has_previous_value(&self) -> bool {
        !self.inner.previous.get().is_empty()
    }

    // =========================================================================
    // Tree Operations
    // =========================================================================

    /// Every node in this subtree whose name is one of `names`, in tree order.
    pub fn get_by_name(&self, names: &[&str]) -> Vec<UiNode> {
        let mut results = Vec::new();
        if names.is_empty() {
            return results;
        }

        if !self.inner.name.is_empty() && names.contains(&self.inner.name.as_str()) {
            results.push(self.clone());
        }
        for child in self.children() {
            results.extend(child.get_by_name(names));
        }
        results
    }

    /// Apply `setter` to this node and every descendant. Refused on
    /// read-only nodes.
    pub fn serialize(&self, setter: NodeCallback<'_>) -> &Self {
        if !self.is_writable() {
            debug!(node = %self.name(), "serialize refused: node is read-only");
            return self;
        }
        self.run_callback("serialize", setter);
        for child in self.children() {
            child.serialize(setter);
        }
        self
    }

    /// Apply `getter` to this node and every descendant.
    pub fn deserialize(&self, getter: NodeCallback<'_>) -> &Self {
        self.run_callback("deserialize", getter);
        for child in self.children() {
            child.deserialize(getter);
        }
        self
    }

    /// Apply `indicator` to this node and every descendant.
    pub fn command(&self, indicator: &dyn Fn(&UiNode)) -> &Self {
        indicator(self);
        for child in self.children() {
            child.command(indicator);
        }
        self
    }

    fn run_callback(&self, operation: &str, callback: NodeCallback<'_>) {
        if let Err(err) = callback(self) {
            error!(node = %self.name(), operation, %err, "node callback failed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::effect;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_text_value_scenario() {
        let node = UiNode::text("Title", "TITLE");
        assert!(!node.is_valid());
        assert_eq!(node.output(), "");

        node.set_value("hello");
        assert_eq!(node.output(), "hello");
        assert!(node.is_valid());

        node.set_value("");
        assert_eq!(node.output(), "");
        assert!(!node.is_valid());
    }

    #[test]
    fn test_output_gated_by_validity() {
        let node = UiNode::text("Title", "TITLE");
        node.set_value("cached");
        node.invalidate();

        assert_eq!(node.value(), "");
        assert_eq!(node.output(), "");
        assert_eq!(node.to_text(), "Title:");

        node.validate();
        assert_eq!(node.output(), "cached");
    }

    #[test]
    fn test_to_text_decorations() {
        let node = UiNode::text_with(
            UiProps {
                prefix: "$".to_string(),
                suffix: " USD".to_string(),
                ..UiProps::new("Price", "PRICE")
            },
            TextParams::default(),
        );
        node.set_value("12");
        assert_eq!(node.to_text(), "Price:$12 USD");

        let bare = UiNode::text("", "");
        bare.set_value("x");
        assert_eq!(bare.to_text(), "x");
    }

    #[test]
    fn test_reset_ignores_read_only_but_clear_does_not() {
        let props = UiProps {
            read_only: true,
            ..UiProps::new("Code", "CODE")
        };
        let node = UiNode::text_with(props, TextParams::default());
        node.set_value("A1");

        node.clear();
        assert_eq!(node.value(), "A1");

        node.reset();
        assert_eq!(node.value(), "");
    }

    #[test]
    fn test_commit_and_rollback() {
        let node = UiNode::text("Note", "NOTE");
        assert!(!node.has_previous_value());

        node.set_value("first").commit();
        node.set_value("second");
        assert_eq!(node.previous_value(), "first");

        node.rollback();
        assert_eq!(node.value(), "first");
        assert!(node.has_previous_value());
    }

    #[test]
    fn test_group_get_by_name_in_tree_order() {
        let a = UiNode::text("A", "X");
        let b = UiNode::text("B", "Y");
        let c = UiNode::text("C", "X");
        let inner = UiNode::group(UiProps::new("Inner", ""), vec![b.clone(), c.clone()]);
        let root = UiNode::group(UiProps::new("Root", "X"), vec![a.clone(), inner]);

        let found = root.get_by_name(&["X"]);
        assert_eq!(found, vec![root.clone(), a.clone(), c.clone()]);

        let both = root.get_by_name(&["Y", "X"]);
        assert_eq!(both.len(), 4);
        assert!(root.get_by_name(&[]).is_empty());
    }

    #[test]
    fn test_group_validity_is_derived() {
        let a = UiNode::text("A", "A");
        let group = UiNode::group(UiProps::default(), vec![a.clone()]);
        assert!(!group.is_valid());

        group.validate();
        assert!(!group.is_valid());

        a.set_value("1");
        assert!(group.is_valid());
        assert_eq!(group.value(), "");
    }

    #[test]
    fn test_group_forbid_write_cascades_to_future_children() {
        let group = UiNode::group(UiProps::default(), vec![UiNode::text("A", "A")]);
        group.forbid_write();
        assert!(group.children().iter().all(|c| !c.is_writable()));

        let late = UiNode::text("B", "B");
        group.push_child(late.clone());
        assert!(!late.is_writable());

        group.permit_write();
        assert!(late.is_writable());
    }

    #[test]
    fn test_serialize_refused_when_read_only() {
        let node = UiNode::text("A", "A");
        let calls = Rc::new(Cell::new(0));

        let c = calls.clone();
        let setter = move |_: &UiNode| -> Result<(), PolicyError> {
            c.set(c.get() + 1);
            Ok(())
        };

        node.serialize(&setter);
        node.forbid_write();
        node.serialize(&setter);
        node.deserialize(&setter);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_failing_callback_does_not_stop_traversal() {
        let a = UiNode::text("A", "A");
        let b = UiNode::text("B", "B");
        let group = UiNode::group(UiProps::default(), vec![a.clone(), b.clone()]);

        group.serialize(&|node: &UiNode| {
            if node.name() == "A" {
                return Err(PolicyError::new("rule exploded"));
            }
            node.set_value("set");
            Ok(())
        });

        assert_eq!(a.value(), "");
        assert_eq!(b.value(), "set");
    }

    #[test]
    fn test_command_visits_self_then_children() {
        let a = UiNode::text("A", "A");
        let group = UiNode::group(UiProps::new("G", "G"), vec![a]);
        let visited = Rc::new(RefCell::new(Vec::new()));

        let v = visited.clone();
        group.command(&move |node| v.borrow_mut().push(node.name().to_string()));
        assert_eq!(*visited.borrow(), vec!["G", "A"]);
    }

    #[test]
    fn test_value_write_notifies_validity_transitions_only() {
        let node = UiNode::text("A", "A");
        let valid = node.resource().valid_signal();
        let runs = Rc::new(Cell::new(0));

        let r = runs.clone();
        let _e = effect(move || {
            let _ = valid.get();
            r.set(r.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        node.set_value("a");
        node.set_value("b");
        assert_eq!(runs.get(), 2);

        node.set_value("");
        assert_eq!(runs.get(), 3);
    }
}
