//! List nodes - delimiter-separated values held by anonymous elements.
//!
//! The elements are the source of truth. The list's `value()` is always
//! the join of the valid elements' values, recomputed on every read.
//!
//! Mutation indices address the valid elements, the items `value()` shows.
//! Every structural mutation works the same way:
//! 1. strip the delimiter from the incoming value
//! 2. rebuild the full delimited string from the valid elements
//! 3. write it through `set_value`, which replaces every element
//! 4. move focus to wherever the previously focused item ended up
//!
//! # Example
//!
//! ```ignore
//! use spark_forms::ui::{UiNode, UiProps, ListParams};
//!
//! let tags = UiNode::list(UiProps::new("Tags", "TAGS"), ListParams::default());
//! tags.set_value("a,b,c");
//! tags.remove(1);
//! assert_eq!(tags.value(), "a,c");
//! ```

use spark_signals::{signal, Signal};
use tracing::{debug, warn};

use super::{ListParams, NodeKind, UiNode, UiProps};

// =============================================================================
// List State
// =============================================================================

pub(super) struct ListState {
    delimiter: String,
    pub(super) elements: Signal<Vec<UiNode>>,
    /// Id of the focused element.
    selected: Signal<Option<u64>>,
}

impl ListState {
    /// Join of the valid elements' values.
    pub(super) fn project(&self) -> String {
        self.elements
            .get()
            .iter()
            .filter(|e| e.is_valid())
            .map(UiNode::value)
            .collect::<Vec<_>>()
            .join(&self.delimiter)
    }

    /// Replace every element with one per non-empty segment of `value`.
    /// Focus is dropped.
    pub(super) fn rebuild(&self, value: &str) {
        let elements: Vec<UiNode> = value
            .split(self.delimiter.as_str())
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let element = UiNode::text("", "");
                element.set_value(segment);
                element
            })
            .collect();

        self.elements.set(elements);
        self.selected.set(None);
    }

    pub(super) fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub(super) fn strip(&self, value: &str) -> String {
        value.replace(self.delimiter.as_str(), "")
    }
}

// =============================================================================
// List API
// =============================================================================

impl UiNode {
    /// List node. An empty delimiter falls back to the default `","`.
    pub fn list(props: UiProps, params: ListParams) -> Self {
        let delimiter = if params.delimiter.is_empty() {
            warn!(node = %props.name, "empty list delimiter replaced with the default");
            ListParams::default().delimiter
        } else {
            params.delimiter
        };

        UiNode::build(
            props,
            NodeKind::List(ListState {
                delimiter,
                elements: signal(Vec::new()),
                selected: signal(None),
            }),
        )
    }

    pub(super) fn list_state(&self) -> Option<&ListState> {
        match &self.inner.kind {
            NodeKind::List(state) => Some(state),
            _ => None,
        }
    }

    pub fn elements(&self) -> Vec<UiNode> {
        self.list_state()
            .map(|l| l.elements.get())
            .unwrap_or_default()
    }

    pub fn has_elements(&self) -> bool {
        !self.elements().is_empty()
    }

    pub fn valid_elements(&self) -> Vec<UiNode> {
        self.elements().into_iter().filter(UiNode::is_valid).collect()
    }

    pub fn available_elements(&self) -> Vec<UiNode> {
        self.elements().into_iter().filter(UiNode::is_available).collect()
    }

    pub fn visible_elements(&self) -> Vec<UiNode> {
        self.elements().into_iter().filter(UiNode::is_visible).collect()
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Index of the focused element.
    pub fn selected_index(&self) -> Option<usize> {
        let state = self.list_state()?;
        let id = state.selected.get()?;
        state.elements.get().iter().position(|e| e.id() == id)
    }

    pub fn focused_element(&self) -> Option<UiNode> {
        let index = self.selected_index()?;
        self.elements().into_iter().nth(index)
    }

    /// Focus the element at `index`. Out of range drops focus.
    pub fn focus_element(&self, index: usize) -> &Self {
        if let Some(state) = self.list_state() {
            let id = state.elements.get().get(index).map(UiNode::id);
            state.selected.set(id);
        }
        self
    }

    pub fn blur_element(&self) -> &Self {
        if let Some(state) = self.list_state() {
            state.selected.set(None);
        }
        self
    }

    pub fn exists_prev_element(&self) -> bool {
        self.selected_index().is_some_and(|i| i > 0)
    }

    pub fn exists_next_element(&self) -> bool {
        self.selected_index()
            .is_some_and(|i| i + 1 < self.elements().len())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Values of the valid elements, with the focused element's position
    /// among them.
    fn items(&self, state: &ListState) -> (Vec<String>, Option<usize>) {
        let focused = self.focused_element();
        let mut items = Vec::new();
        let mut focus = None;

        for element in self.valid_elements() {
            let value = state.strip(&element.value());
            if value.is_empty() {
                continue;
            }
            if focused.as_ref() == Some(&element) {
                focus = Some(items.len());
            }
            items.push(value);
        }
        (items, focus)
    }

    /// Write the rebuilt string through the value path, then refocus.
    fn commit_items(&self, state: &ListState, items: Vec<String>, focus: Option<usize>) {
        self.set_value(items.join(state.delimiter()));
        match focus {
            Some(index) => {
                self.focus_element(index);
            }
            None => {
                state.selected.set(None);
            }
        }
    }

    /// Prepare an incoming item, `None` if not applicable.
    fn incoming(&self, value: &str) -> Option<(&ListState, String)> {
        let Some(state) = self.list_state() else {
            debug!(node = %self.name(), kind = ?self.kind(), "list operation ignored: not a list");
            return None;
        };
        let value = state.strip(value);
        if value.is_empty() {
            debug!(node = %self.name(), "list operation ignored: empty value");
            return None;
        }
        Some((state, value))
    }

    pub fn push(&self, value: &str) -> &Self {
        let Some((state, value)) = self.incoming(value) else {
            return self;
        };
        let (mut items, focus) = self.items(state);

        items.push(value);
        self.commit_items(state, items, focus);
        self
    }

    pub fn unshift(&self, value: &str) -> &Self {
        let Some((state, value)) = self.incoming(value) else {
            return self;
        };
        let (mut items, focus) = self.items(state);

        items.insert(0, value);
        self.commit_items(state, items, focus.map(|i| i + 1));
        self
    }

    /// Insert before the item at `index`.
    pub fn insert(&self, index: usize, value: &str) -> &Self {
        let Some((state, value)) = self.incoming(value) else {
            return self;
        };
        let (mut items, focus) = self.items(state);
        if index >= items.len() {
            debug!(node = %self.name(), index, "insert ignored: index out of range");
            return self;
        }

        items.insert(index, value);
        let focus = focus.map(|i| if i < index { i } else { i + 1 });
        self.commit_items(state, items, focus);
        self
    }

    pub fn replace(&self, index: usize, value: &str) -> &Self {
        let Some((state, value)) = self.incoming(value) else {
            return self;
        };
        let (mut items, focus) = self.items(state);
        if index >= items.len() {
            debug!(node = %self.name(), index, "replace ignored: index out of range");
            return self;
        }

        items[index] = value;
        self.commit_items(state, items, focus);
        self
    }

    pub fn remove(&self, index: usize) -> &Self {
        let Some(state) = self.list_state() else {
            return self;
        };
        let (mut items, focus) = self.items(state);
        if index >= items.len() {
            debug!(node = %self.name(), index, "remove ignored: index out of range");
            return self;
        }

        items.remove(index);
        let remaining = items.len();
        let focus = focus.and_then(|i| {
            if i < index {
                Some(i)
            } else if i > index {
                Some(i - 1)
            } else if remaining == 0 {
                None
            } else {
                Some(i.min(remaining - 1))
            }
        });

        self.commit_items(state, items, focus);
        self
    }

    /// Exchange the items at `a` and `b`. Focus follows its item.
    pub fn swap(&self, a: usize, b: usize) -> &Self {
        let Some(state) = self.list_state() else {
            return self;
        };
        let (mut items, focus) = self.items(state);
        if a == b || a >= items.len() || b >= items.len() {
            debug!(node = %self.name(), a, b, "swap ignored");
            return self;
        }

        items.swap(a, b);
        let focus = focus.map(|i| {
            if i == a {
                b
            } else if i == b {
                a
            } else {
                i
            }
        });
        self.commit_items(state, items, focus);
        self
    }

    /// Position of the focused element among the valid elements.
    fn focused_item(&self) -> Option<usize> {
        let focused = self.focused_element()?;
        self.valid_elements().iter().position(|e| *e == focused)
    }

    /// Move the focused item one position up.
    pub fn swap_prev(&self) -> &Self {
        match self.focused_item() {
            Some(i) if i > 0 => self.swap(i, i - 1),
            _ => self,
        }
    }

    /// Move the focused item one position down.
    pub fn swap_next(&self) -> &Self {
        match self.focused_item() {
            Some(i) => self.swap(i, i + 1),
            None => self,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
