//! Screen-level helpers built on top of UI trees.
//!
//! - [`UiMapper`] - name index over registered trees
//! - [`UiValidator`] - ordered validation rules
//! - [`UiValueCopier`] - one-off value transfer between named nodes
//! - [`UiDisplayer`] / [`UiValueReflector`] / [`UiValueTransmitter`] - live
//!   propagation from source values to other nodes
//! - [`publish_options`] - select options fed by a master repository

mod copier;
mod mapper;
mod options;
mod propagation;
mod validator;

pub use copier::{CopyFilter, CopyMode, CopySource, UiValueCopier};
pub use mapper::{UiMapper, MIN_SHOW_INTERVAL};
pub use options::publish_options;
pub use propagation::{Instruction, Propagation, UiDisplayer, UiValueReflector, UiValueTransmitter};
pub use validator::{UiValidator, ValidationRule};
