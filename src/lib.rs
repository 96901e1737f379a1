//! # spark-forms
//!
//! Reactive view-model framework for forms, option lists and repositories.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! Every piece of state is a signal. A form is a tree of [`UiNode`]s, each
//! a shared handle carrying a [`Resource`] (available/valid/visible), a
//! single value cell and a closed [`ui::UiKind`] that selects its behaviour.
//! Collections derive their validity from options, lists project their
//! value from elements.
//!
//! Data flows one way through the framework:
//! ```text
//! source records → repository policies → published view → options
//!                                                           ↓
//! request payload ← export_data ← UI tree ← import_data ← response payload
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Payload, ResourceState, status enums)
//! - [`resource`] - The three-flag resource model
//! - [`ui`] - UI nodes: text, date, date range, option collections, lists, groups
//! - [`repository`] - Master and data repositories with filter/sort policies
//! - [`helper`] - Name mapper, validator, value copier, live propagation, option publishing
//! - [`document`] - Page load lifecycle, auto-reload, offline handlers
//! - [`deferred`] / [`timer`] - Single-fire results and injected timers

pub mod deferred;
pub mod document;
pub mod error;
pub mod helper;
pub mod repository;
pub mod resource;
pub mod timer;
pub mod types;
pub mod ui;

// Re-export commonly used items
pub use types::*;

pub use deferred::{Deferred, DeferredState};

pub use error::{LoadError, PolicyError, RepositoryError, StructureError, UnknownRequestKind};

pub use resource::Resource;

pub use timer::{ManualTimers, TimerId, Timers};

pub use ui::{
    DateParams, ListParams, NodeCallback, OptionSpec, TextParams, UiKind, UiNode, UiProps,
};

pub use repository::{DataRepository, MasterRepository};

pub use helper::{
    publish_options, CopyMode, CopySource, Propagation, UiDisplayer, UiMapper, UiValidator,
    UiValueCopier, UiValueReflector, UiValueTransmitter,
};

pub use document::{
    DocumentBase, LoadOptions, Metrics, MetricsParams, Reply, RequestKind, ServiceHandlers,
};
