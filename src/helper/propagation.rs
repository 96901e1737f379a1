//! Live propagation between named nodes.
//!
//! Each helper resolves its sources and destinations through a
//! [`UiMapper`], then installs one effect per source. The effect runs once
//! immediately and again whenever the source's value changes:
//!
//! - [`UiDisplayer`] - shows destinations while a policy accepts the value,
//!   hides the invalid ones otherwise
//! - [`UiValueReflector`] - writes the (converted) value into destinations
//! - [`UiValueTransmitter`] - hands the value and each destination to a
//!   caller instruction
//!
//! ```ignore
//! let mut reflector = UiValueReflector::new(mapper.clone());
//! let mirror = reflector.from("EMAIL").to("EMAIL_CONFIRM").apply();
//! // ... later
//! mirror.stop();
//! ```
//!
//! Propagation lasts as long as the returned [`Propagation`] handle.

use std::fmt;
use std::rc::Rc;

use spark_signals::{effect, untrack};
use tracing::{debug, error};

use super::UiMapper;
use crate::error::PolicyError;
use crate::ui::UiNode;

// =============================================================================
// Propagation Handle
// =============================================================================

/// Running propagation. Dropping the handle stops it.
#[must_use = "propagation stops as soon as the handle is dropped"]
pub struct Propagation {
    stops: Vec<Box<dyn FnOnce()>>,
}

impl Propagation {
    fn inert() -> Self {
        Self { stops: Vec::new() }
    }

    /// Number of watched sources.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl fmt::Debug for Propagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Propagation")
            .field("sources", &self.stops.len())
            .finish()
    }
}

impl Drop for Propagation {
    fn drop(&mut self) {
        for stop in self.stops.drain(..) {
            stop();
        }
    }
}

/// Run `handler` with each source's value now and on every change.
fn watch(sources: &[UiNode], handler: Rc<dyn Fn(&str)>) -> Propagation {
    let stops = sources
        .iter()
        .map(|source| {
            let source = source.clone();
            let handler = handler.clone();
            let stop = effect(move || {
                let value = source.value();
                // Destinations are written, never tracked
                untrack(|| handler(&value));
            });
            Box::new(stop) as Box<dyn FnOnce()>
        })
        .collect();
    Propagation { stops }
}

// =============================================================================
// Endpoints
// =============================================================================

/// Sources and destinations resolved by name.
struct Endpoints {
    mapper: UiMapper,
    sources: Vec<UiNode>,
    destinations: Vec<UiNode>,
}

impl Endpoints {
    fn new(mapper: UiMapper) -> Self {
        Self {
            mapper,
            sources: Vec::new(),
            destinations: Vec::new(),
        }
    }

    fn is_incomplete(&self, helper: &str) -> bool {
        let incomplete = self.sources.is_empty() || self.destinations.is_empty();
        if incomplete {
            debug!(helper, "propagation skipped: no sources or destinations");
        }
        incomplete
    }

    fn reset(&mut self) {
        self.sources.clear();
        self.destinations.clear();
    }
}

macro_rules! endpoint_methods {
    () => {
        /// Watch every node named `name`.
        pub fn from(&mut self, name: &str) -> &mut Self {
            self.endpoints.sources = self.endpoints.mapper.get(name);
            self
        }

        /// Drive every node named `name`.
        pub fn to(&mut self, name: &str) -> &mut Self {
            self.endpoints.destinations = self.endpoints.mapper.get(name);
            self
        }

        /// Forget sources and destinations.
        pub fn reset(&mut self) -> &mut Self {
            self.endpoints.reset();
            self
        }
    };
}

// =============================================================================
// UiDisplayer
// =============================================================================

/// Toggles destination visibility from source values.
pub struct UiDisplayer {
    endpoints: Endpoints,
}

impl UiDisplayer {
    pub fn new(mapper: UiMapper) -> Self {
        Self {
            endpoints: Endpoints::new(mapper),
        }
    }

    endpoint_methods!();

    /// Show destinations while the source value is non-empty.
    pub fn apply(&self) -> Propagation {
        self.apply_with(|value| !value.is_empty())
    }

    /// Show destinations while `policy` accepts the source value. When it
    /// does not, destinations that hold no valid value are hidden.
    pub fn apply_with(&self, policy: impl Fn(&str) -> bool + 'static) -> Propagation {
        if self.endpoints.is_incomplete("displayer") {
            return Propagation::inert();
        }

        let destinations = self.endpoints.destinations.clone();
        watch(
            &self.endpoints.sources,
            Rc::new(move |value: &str| {
                let visible = policy(value);
                for destination in &destinations {
                    if visible {
                        destination.show();
                    } else if !destination.is_valid() {
                        destination.hide();
                    }
                }
            }),
        )
    }
}

// =============================================================================
// UiValueReflector
// =============================================================================

/// Mirrors source values into destinations.
pub struct UiValueReflector {
    endpoints: Endpoints,
}

impl UiValueReflector {
    pub fn new(mapper: UiMapper) -> Self {
        Self {
            endpoints: Endpoints::new(mapper),
        }
    }

    endpoint_methods!();

    /// Copy the source value as is.
    pub fn apply(&self) -> Propagation {
        self.apply_with(|value| Some(value.to_string()))
    }

    /// Write `converter(value)` into every destination. `None` skips the
    /// write. Destinations that are also sources are left out.
    pub fn apply_with(&self, converter: impl Fn(&str) -> Option<String> + 'static) -> Propagation {
        if self.endpoints.is_incomplete("reflector") {
            return Propagation::inert();
        }

        let destinations: Vec<UiNode> = self
            .endpoints
            .destinations
            .iter()
            .filter(|d| {
                let loops = self.endpoints.sources.contains(*d);
                if loops {
                    debug!(node = %d.name(), "reflection target is also a source");
                }
                !loops
            })
            .cloned()
            .collect();

        watch(
            &self.endpoints.sources,
            Rc::new(move |value: &str| {
                let Some(converted) = converter(value) else {
                    return;
                };
                for destination in &destinations {
                    destination.set_value(converted.as_str());
                }
            }),
        )
    }
}

// =============================================================================
// UiValueTransmitter
// =============================================================================

/// Instruction run per destination: `(source value, destination)`.
pub type Instruction = Rc<dyn Fn(&str, &UiNode) -> Result<(), PolicyError>>;

/// Hands source values to a caller instruction, once per destination.
pub struct UiValueTransmitter {
    endpoints: Endpoints,
}

impl UiValueTransmitter {
    pub fn new(mapper: UiMapper) -> Self {
        Self {
            endpoints: Endpoints::new(mapper),
        }
    }

    endpoint_methods!();

    /// Run `instruction` for every destination whenever a source changes.
    /// A failing instruction is logged and the remaining destinations still
    /// run.
    pub fn apply(
        &self,
        instruction: impl Fn(&str, &UiNode) -> Result<(), PolicyError> + 'static,
    ) -> Propagation {
        if self.endpoints.is_incomplete("transmitter") {
            return Propagation::inert();
        }

        let instruction: Instruction = Rc::new(instruction);
        let destinations = self.endpoints.destinations.clone();
        watch(
            &self.endpoints.sources,
            Rc::new(move |value: &str| {
                for destination in &destinations {
                    if let Err(err) = instruction(value, destination) {
                        error!(node = %destination.name(), %err, "value transmission failed");
                    }
                }
            }),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
