//! Page-wide switches shared by every document.

use std::time::Duration;

use spark_signals::{signal, Signal};

use crate::resource::set_flag;

/// Shortest interval auto-reload will run at.
pub const MIN_RELOAD_INTERVAL: Duration = Duration::from_secs(10);

/// Initial metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsParams {
    /// Start in test mode (default: false).
    pub test_mode: bool,
    /// Start with auto-reload switched on (default: false).
    pub auto_reload: bool,
    /// Delay between reloads (default: 60s).
    pub reload_interval: Duration,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            test_mode: false,
            auto_reload: false,
            reload_interval: Duration::from_secs(60),
        }
    }
}

/// Shared page switches. Clones share state.
///
/// Auto-reload has two independent switches: `auto_reload` turns the
/// reload loop on and off, `auto_reload_available` pauses the reload
/// itself while keeping the loop scheduled.
#[derive(Clone)]
pub struct Metrics {
    reload_interval: Duration,
    test_mode: Signal<bool>,
    auto_reload: Signal<bool>,
    auto_reload_available: Signal<bool>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(MetricsParams::default())
    }
}

impl Metrics {
    pub fn new(params: MetricsParams) -> Self {
        Self {
            reload_interval: params.reload_interval,
            test_mode: signal(params.test_mode),
            auto_reload: signal(params.auto_reload),
            auto_reload_available: signal(true),
        }
    }

    pub fn reload_interval(&self) -> Duration {
        self.reload_interval
    }

    /// Whether the interval is long enough for auto-reload to run.
    pub fn allows_auto_reload(&self) -> bool {
        self.reload_interval >= MIN_RELOAD_INTERVAL
    }

    // =========================================================================
    // Test mode
    // =========================================================================

    pub fn is_test_mode(&self) -> bool {
        self.test_mode.get()
    }

    pub fn on_test_mode(&self) -> &Self {
        set_flag(&self.test_mode, true);
        self
    }

    pub fn off_test_mode(&self) -> &Self {
        set_flag(&self.test_mode, false);
        self
    }

    pub fn switch_test_mode(&self) -> &Self {
        set_flag(&self.test_mode, !self.test_mode.get());
        self
    }

    // =========================================================================
    // Auto-reload
    // =========================================================================

    pub fn is_auto_reload(&self) -> bool {
        self.auto_reload.get()
    }

    pub fn auto_reload_signal(&self) -> Signal<bool> {
        self.auto_reload.clone()
    }

    pub fn on_auto_reload(&self) -> &Self {
        set_flag(&self.auto_reload, true);
        self
    }

    pub fn off_auto_reload(&self) -> &Self {
        set_flag(&self.auto_reload, false);
        self
    }

    pub fn switch_auto_reload(&self) -> &Self {
        set_flag(&self.auto_reload, !self.auto_reload.get());
        self
    }

    pub fn is_auto_reload_available(&self) -> bool {
        self.auto_reload_available.get()
    }

    pub fn enable_auto_reload(&self) -> &Self {
        set_flag(&self.auto_reload_available, true);
        self
    }

    pub fn disable_auto_reload(&self) -> &Self {
        set_flag(&self.auto_reload_available, false);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let metrics = Metrics::default();
        assert!(!metrics.is_test_mode());
        assert!(!metrics.is_auto_reload());
        assert!(metrics.is_auto_reload_available());
        assert_eq!(metrics.reload_interval(), Duration::from_secs(60));
        assert!(metrics.allows_auto_reload());
    }

    #[test]
    fn test_switches_toggle() {
        let metrics = Metrics::default();
        metrics.switch_test_mode();
        assert!(metrics.is_test_mode());
        metrics.switch_test_mode();
        assert!(!metrics.is_test_mode());

        let shared = metrics.clone();
        metrics.on_auto_reload();
        assert!(shared.is_auto_reload());
    }

    #[test]
    fn test_short_interval_disallows_auto_reload() {
        let metrics = Metrics::new(MetricsParams {
            reload_interval: Duration::from_secs(5),
            ..Default::default()
        });
        assert!(!metrics.allows_auto_reload());
    }
}
