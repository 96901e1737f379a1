//! Screen-level validation rules.

use std::rc::Rc;

use tracing::error;

use crate::error::PolicyError;

/// A validation rule. `Ok(false)` fails validation.
pub type ValidationRule = Rc<dyn Fn() -> Result<bool, PolicyError>>;

/// Ordered list of validation rules.
#[derive(Clone, Default)]
pub struct UiValidator {
    rules: Vec<ValidationRule>,
}

impl UiValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: impl Fn() -> Result<bool, PolicyError> + 'static) -> &mut Self {
        self.rules.push(Rc::new(rule));
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.rules.clear();
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run rules in order, stopping at the first failure.
    ///
    /// A rule that errors stops evaluation without failing validation.
    pub fn validate(&self) -> bool {
        for (index, rule) in self.rules.iter().enumerate() {
            match rule() {
                Ok(true) => {}
                Ok(false) => return false,
                Err(err) => {
                    error!(rule = index, %err, "validation rule failed");
                    return true;
                }
            }
        }
        true
    }
}
