//! Construction parameters for UI nodes.
//!
//! Parameters are plain values with defaults. Build them with struct update
//! syntax:
//!
//! ```ignore
//! use spark_forms::ui::{UiNode, UiProps, TextParams};
//!
//! let remarks = UiNode::text_with(
//!     UiProps { read_only: true, ..UiProps::new("Remarks", "REMARKS") },
//!     TextParams { max_length: Some(200), ..Default::default() },
//! );
//! ```

/// Properties shared by every node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiProps {
    /// Display label.
    pub caption: String,
    /// Wire-format key. Empty for presentation-only nodes.
    pub name: String,
    /// Start with writes forbidden (default: false).
    pub read_only: bool,
    /// Start with copying permitted (default: true).
    pub copyable: bool,
    /// Text placed before the output in `to_text`.
    pub prefix: String,
    /// Text placed after the output in `to_text`.
    pub suffix: String,
}

impl UiProps {
    pub fn new(caption: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Default for UiProps {
    fn default() -> Self {
        Self {
            caption: String::new(),
            name: String::new(),
            read_only: false,
            copyable: true,
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

/// Text node parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextParams {
    /// Maximum length in grapheme clusters. `None` means unlimited.
    pub max_length: Option<usize>,
    /// Joins incoming wire segments (default: empty).
    pub delimiter: String,
}

/// Date node parameters (chrono format strings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParams {
    /// Canonical storage format of `value`.
    pub value_format: String,
    /// Display format of `output`.
    pub output_format: String,
}

impl Default for DateParams {
    fn default() -> Self {
        Self {
            value_format: "%Y/%m/%d".to_string(),
            output_format: "%Y/%m/%d".to_string(),
        }
    }
}

/// List node parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Separates list items inside `value` (default: ",").
    pub delimiter: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
        }
    }
}

/// Plain description of one option of a select/check/radio collection.
///
/// Collections build fresh option nodes from these, so option state is
/// never shared between two collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub caption: String,
    pub name: String,
    pub value: String,
}

impl OptionSpec {
    pub fn new(caption: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            name: String::new(),
            value: value.into(),
        }
    }

    /// Give the option its own wire name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
