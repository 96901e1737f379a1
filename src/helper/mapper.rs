//! Name index over registered UI trees.
//!
//! The mapper is an explicit value: build one per screen and hand clones
//! to whatever needs name lookup (copiers, documents). Clones share the
//! same index.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::deferred::Deferred;
use crate::timer::Timers;
use crate::types::Payload;
use crate::ui::UiNode;

/// Shortest gap between two nodes shown by [`UiMapper::show_all_staggered`].
pub const MIN_SHOW_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Default)]
struct MapperInner {
    roots: Vec<UiNode>,
    by_name: HashMap<String, Vec<UiNode>>,
    hidden: Vec<UiNode>,
}

/// Shared name index over UI trees.
#[derive(Clone, Default)]
pub struct UiMapper {
    inner: Rc<RefCell<MapperInner>>,
}

impl UiMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tree and index every named node in it.
    pub fn add(&self, root: &UiNode) -> &Self {
        let named = RefCell::new(Vec::new());
        root.command(&|node| {
            if !node.name().is_empty() {
                named.borrow_mut().push(node.clone());
            }
        });

        let mut inner = self.inner.borrow_mut();
        for node in named.into_inner() {
            inner
                .by_name
                .entry(node.name().to_string())
                .or_default()
                .push(node);
        }
        inner.roots.push(root.clone());
        self
    }

    /// Every indexed node named `name`, in registration order.
    pub fn get(&self, name: &str) -> Vec<UiNode> {
        self.inner
            .borrow()
            .by_name
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn first(&self, name: &str) -> Option<UiNode> {
        self.inner
            .borrow()
            .by_name
            .get(name)
            .and_then(|nodes| nodes.first().cloned())
    }

    pub fn roots(&self) -> Vec<UiNode> {
        self.inner.borrow().roots.clone()
    }

    pub fn reset_all(&self) -> &Self {
        for root in self.roots() {
            root.reset();
        }
        self
    }

    pub fn clear_all(&self) -> &Self {
        for root in self.roots() {
            root.clear();
        }
        self
    }

    /// Hide every visible node, remembering which ones were hidden.
    /// Does nothing while a previous `hide_all` is still in effect.
    pub fn hide_all(&self) -> &Self {
        if !self.inner.borrow().hidden.is_empty() {
            debug!("hide_all ignored: nodes already hidden");
            return self;
        }

        let hidden = RefCell::new(Vec::new());
        for root in self.roots() {
            root.command(&|node| {
                if node.is_visible() {
                    node.hide();
                    hidden.borrow_mut().push(node.clone());
                }
            });
        }
        self.inner.borrow_mut().hidden = hidden.into_inner();
        self
    }

    /// Show exactly the nodes hidden by `hide_all`.
    pub fn show_all(&self) -> &Self {
        let hidden = std::mem::take(&mut self.inner.borrow_mut().hidden);
        for node in hidden {
            node.show();
        }
        self
    }

    /// Show the nodes hidden by `hide_all` one at a time, `interval` apart
    /// (at least [`MIN_SHOW_INTERVAL`]). Resolves once the last one is
    /// shown. `hide_all` stays blocked until then.
    pub fn show_all_staggered(&self, timers: Rc<dyn Timers>, interval: Duration) -> Deferred<()> {
        let queue: VecDeque<UiNode> = self.inner.borrow().hidden.iter().cloned().collect();
        if queue.is_empty() {
            return Deferred::resolved(());
        }

        let done = Deferred::new();
        self.show_next(timers, interval.max(MIN_SHOW_INTERVAL), queue, done.clone());
        done
    }

    fn show_next(
        &self,
        timers: Rc<dyn Timers>,
        interval: Duration,
        mut queue: VecDeque<UiNode>,
        done: Deferred<()>,
    ) {
        let mapper = self.clone();
        let next = timers.clone();
        timers.set_timeout(
            interval,
            Box::new(move || {
                if let Some(node) = queue.pop_front() {
                    node.show();
                }
                if queue.is_empty() {
                    mapper.inner.borrow_mut().hidden.clear();
                    done.resolve(());
                } else {
                    mapper.show_next(next, interval, queue, done);
                }
            }),
        );
    }

    pub fn import_data(&self, payload: &Payload) -> &Self {
        for root in self.roots() {
            root.import_data(payload);
        }
        self
    }

    pub fn export_data(&self) -> Payload {
        let mut payload = Payload::new();
        for root in self.roots() {
            root.export_data(&mut payload);
        }
        payload
    }
}
