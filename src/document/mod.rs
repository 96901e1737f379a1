//! Documents - page-level view-models.
//!
//! A [`DocumentBase`] owns the page's load lifecycle:
//!
//! ```text
//! Ready ──load──> Loading ──ready resolves──> Done ──> auto-reload loop
//!                    │
//!                    ├──ready rejects──> Error
//!                    └──watchdog fires─> Timeout
//! ```
//!
//! The watchdog and the reload loop run on the injected [`Timers`]. The
//! reload loop follows [`Metrics`]: it starts once the document is done
//! and auto-reload is switched on, and stops when it is switched off.

mod metrics;
mod service;

pub use metrics::{Metrics, MetricsParams, MIN_RELOAD_INTERVAL};
pub use service::{Reply, RequestHandler, RequestKind, ServiceHandlers};

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use spark_signals::{effect, signal, Signal};
use tracing::{debug, info, warn};

use crate::deferred::Deferred;
use crate::error::LoadError;
use crate::resource::Resource;
use crate::timer::{TimerId, Timers};
use crate::types::DocumentStatus;

/// Called when a load misses its deadline.
pub type TimeoutHandler = Rc<dyn Fn(&DocumentBase)>;

/// Options for [`DocumentBase::load`].
#[derive(Clone)]
pub struct LoadOptions {
    /// Deadline for the ready signal (default: 15s).
    pub timeout: Duration,
    /// Runs on timeout. Without one, the timeout is logged.
    pub on_timeout: Option<TimeoutHandler>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            on_timeout: None,
        }
    }
}

struct DocumentInner {
    resource: Resource,
    status: Signal<DocumentStatus>,
    metrics: Metrics,
    timers: Rc<dyn Timers>,
    reload: RefCell<Option<Rc<dyn Fn()>>>,
    reload_tick: Cell<Option<TimerId>>,
    /// Stops the effect that follows the auto-reload switch.
    watcher: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Drop for DocumentInner {
    fn drop(&mut self) {
        if let Some(stop) = self.watcher.get_mut().take() {
            stop();
        }
        if let Some(id) = self.reload_tick.take() {
            self.timers.clear_timeout(id);
        }
    }
}

/// Shared handle to a document.
#[derive(Clone)]
pub struct DocumentBase {
    inner: Rc<DocumentInner>,
}

impl DocumentBase {
    pub fn new(metrics: Metrics, timers: Rc<dyn Timers>) -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                resource: Resource::new(),
                status: signal(DocumentStatus::Ready),
                metrics,
                timers,
                reload: RefCell::new(None),
                reload_tick: Cell::new(None),
                watcher: RefCell::new(None),
            }),
        }
    }

    fn from_weak(weak: &Weak<DocumentInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn resource(&self) -> &Resource {
        &self.inner.resource
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    // =========================================================================
    // Status
    // =========================================================================

    pub fn status(&self) -> DocumentStatus {
        self.inner.status.get()
    }

    pub fn status_signal(&self) -> Signal<DocumentStatus> {
        self.inner.status.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.status() == DocumentStatus::Ready
    }

    pub fn is_busy(&self) -> bool {
        self.status() == DocumentStatus::Loading
    }

    pub fn is_completed(&self) -> bool {
        self.status() == DocumentStatus::Done
    }

    pub fn is_timeout(&self) -> bool {
        self.status() == DocumentStatus::Timeout
    }

    pub fn is_error(&self) -> bool {
        self.status() == DocumentStatus::Error
    }

    fn set_status(&self, status: DocumentStatus) {
        if self.inner.status.get() == status {
            return;
        }
        debug!(?status, "document status");
        self.inner.status.set(status);

        if status == DocumentStatus::Done {
            self.watch_auto_reload();
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Wait for `ready` under a watchdog.
    ///
    /// Refused unless the document is `Ready`, in which case the returned
    /// deferred is already resolved. Whichever of `ready` and the watchdog
    /// settles first decides the outcome. A late `ready` is ignored.
    pub fn load(&self, ready: Deferred<()>, options: LoadOptions) -> Deferred<()> {
        if !self.is_ready() {
            debug!(status = ?self.status(), "load refused: document is not ready");
            return Deferred::resolved(());
        }
        self.set_status(DocumentStatus::Loading);

        let result = Deferred::new();

        let watchdog = {
            let weak = Rc::downgrade(&self.inner);
            let result = result.clone();
            let on_timeout = options.on_timeout.clone();
            self.inner.timers.set_timeout(
                options.timeout,
                Box::new(move || {
                    if !result.is_pending() {
                        return;
                    }
                    if let Some(doc) = DocumentBase::from_weak(&weak) {
                        doc.set_status(DocumentStatus::Timeout);
                        match &on_timeout {
                            Some(handler) => handler(&doc),
                            None => warn!("document load timed out"),
                        }
                    }
                    result.reject(LoadError::Timeout);
                }),
            )
        };

        let weak = Rc::downgrade(&self.inner);
        let settled = result.clone();
        ready.always(move |outcome| {
            if !settled.is_pending() {
                debug!("late ready signal ignored");
                return;
            }
            let Some(doc) = DocumentBase::from_weak(&weak) else {
                return;
            };
            doc.inner.timers.clear_timeout(watchdog);

            match outcome {
                Ok(()) => {
                    doc.set_status(DocumentStatus::Done);
                    settled.resolve(());
                }
                Err(err) => {
                    warn!(%err, "document failed to load");
                    doc.set_status(DocumentStatus::Error);
                    settled.reject(err.clone());
                }
            }
        });

        result
    }

    // =========================================================================
    // Reload
    // =========================================================================

    /// Install the reload hook run by `reload` and the auto-reload loop.
    pub fn set_reload(&self, hook: impl Fn() + 'static) -> &Self {
        *self.inner.reload.borrow_mut() = Some(Rc::new(hook));
        self
    }

    pub fn reload(&self) -> &Self {
        let hook = self.inner.reload.borrow().clone();
        match hook {
            Some(hook) => hook(),
            None => info!("reload requested but no reload hook is installed"),
        }
        self
    }

    /// Whether a reload tick is currently scheduled.
    pub fn is_auto_reloading(&self) -> bool {
        self.inner.reload_tick.get().is_some()
    }

    /// Follow the metrics auto-reload switch from now on.
    fn watch_auto_reload(&self) {
        if self.inner.watcher.borrow().is_some() {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        let switch = self.inner.metrics.auto_reload_signal();
        let stop = effect(move || {
            let on = switch.get();
            if let Some(doc) = DocumentBase::from_weak(&weak) {
                if on {
                    doc.start_auto_reload();
                } else {
                    doc.stop_auto_reload();
                }
            }
        });
        *self.inner.watcher.borrow_mut() = Some(Box::new(stop));
    }

    fn start_auto_reload(&self) {
        if self.is_auto_reloading() {
            return;
        }
        if !self.inner.metrics.allows_auto_reload() {
            debug!(
                interval = ?self.inner.metrics.reload_interval(),
                "auto-reload not started: interval too short"
            );
            return;
        }
        self.schedule_reload_tick();
    }

    fn stop_auto_reload(&self) {
        if let Some(id) = self.inner.reload_tick.take() {
            self.inner.timers.clear_timeout(id);
        }
    }

    fn schedule_reload_tick(&self) {
        let weak = Rc::downgrade(&self.inner);
        let id = self.inner.timers.set_timeout(
            self.inner.metrics.reload_interval(),
            Box::new(move || {
                let Some(doc) = DocumentBase::from_weak(&weak) else {
                    return;
                };
                doc.inner.reload_tick.set(None);

                if doc.inner.metrics.is_auto_reload_available() {
                    doc.reload();
                }
                if doc.inner.metrics.is_auto_reload() && !doc.is_auto_reloading() {
                    doc.schedule_reload_tick();
                }
            }),
        );
        self.inner.reload_tick.set(Some(id));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::DeferredState;
    use crate::timer::ManualTimers;

    fn document(params: MetricsParams) -> (DocumentBase, ManualTimers) {
        let timers = ManualTimers::new();
        let doc = DocumentBase::new(Metrics::new(params), Rc::new(timers.clone()));
        (doc, timers)
    }

    fn reload_counter(doc: &DocumentBase) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        doc.set_reload(move || c.set(c.get() + 1));
        count
    }

    #[test]
    fn test_load_completes_when_ready_resolves() {
        let (doc, timers) = document(MetricsParams::default());
        let ready = Deferred::new();

        let result = doc.load(ready.clone(), LoadOptions::default());
        assert!(doc.is_busy());
        assert!(result.is_pending());
        assert_eq!(timers.pending_count(), 1);

        ready.resolve(());
        assert!(doc.is_completed());
        assert_eq!(result.state(), DeferredState::Resolved);
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_watchdog_times_out() {
        let (doc, timers) = document(MetricsParams::default());
        let ready = Deferred::new();
        let fired = Rc::new(Cell::new(false));

        let f = fired.clone();
        let options = LoadOptions {
            on_timeout: Some(Rc::new(move |doc: &DocumentBase| f.set(doc.is_timeout()))),
            ..Default::default()
        };
        let result = doc.load(ready.clone(), options);

        timers.advance(Duration::from_secs(14));
        assert!(result.is_pending());

        timers.advance(Duration::from_secs(1));
        assert!(fired.get());
        assert!(doc.is_timeout());
        assert_eq!(result.result(), Some(Err(LoadError::Timeout)));

        // A late ready signal does not revive the document
        ready.resolve(());
        assert!(doc.is_timeout());
    }

    #[test]
    fn test_failed_ready_marks_error() {
        let (doc, _timers) = document(MetricsParams::default());
        let result = doc.load(
            Deferred::rejected(LoadError::Failed("503".to_string())),
            LoadOptions::default(),
        );

        assert!(doc.is_error());
        assert_eq!(result.result(), Some(Err(LoadError::Failed("503".to_string()))));
    }

    #[test]
    fn test_load_is_not_reentrant() {
        let (doc, _timers) = document(MetricsParams::default());
        let first = doc.load(Deferred::new(), LoadOptions::default());
        let second = doc.load(Deferred::resolved(()), LoadOptions::default());

        assert!(first.is_pending());
        assert_eq!(second.state(), DeferredState::Resolved);
        assert!(doc.is_busy());
    }

    #[test]
    fn test_auto_reload_follows_metrics() {
        let (doc, timers) = document(MetricsParams {
            auto_reload: true,
            reload_interval: Duration::from_secs(10),
            ..Default::default()
        });
        let reloads = reload_counter(&doc);

        doc.load(Deferred::resolved(()), LoadOptions::default());
        assert!(doc.is_auto_reloading());

        timers.advance(Duration::from_secs(30));
        assert_eq!(reloads.get(), 3);

        // Paused: the loop keeps ticking without reloading
        doc.metrics().disable_auto_reload();
        timers.advance(Duration::from_secs(20));
        assert_eq!(reloads.get(), 3);
        assert!(doc.is_auto_reloading());

        doc.metrics().enable_auto_reload().off_auto_reload();
        assert!(!doc.is_auto_reloading());
        timers.advance(Duration::from_secs(30));
        assert_eq!(reloads.get(), 3);

        doc.metrics().on_auto_reload();
        timers.advance(Duration::from_secs(10));
        assert_eq!(reloads.get(), 4);
    }

    #[test]
    fn test_auto_reload_waits_for_done() {
        let (doc, timers) = document(MetricsParams::default());
        let reloads = reload_counter(&doc);

        doc.metrics().on_auto_reload();
        timers.advance(Duration::from_secs(120));
        assert!(!doc.is_auto_reloading());

        doc.load(Deferred::resolved(()), LoadOptions::default());
        timers.advance(Duration::from_secs(60));
        assert_eq!(reloads.get(), 1);
    }

    #[test]
    fn test_short_interval_never_reloads() {
        let (doc, timers) = document(MetricsParams {
            auto_reload: true,
            reload_interval: Duration::from_secs(5),
            ..Default::default()
        });
        let reloads = reload_counter(&doc);

        doc.load(Deferred::resolved(()), LoadOptions::default());
        assert!(!doc.is_auto_reloading());
        timers.advance(Duration::from_secs(60));
        assert_eq!(reloads.get(), 0);
    }
}
