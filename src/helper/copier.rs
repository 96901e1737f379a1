//! Value transfer between named nodes.
//!
//! ```ignore
//! let mut copier = UiValueCopier::new(mapper.clone());
//! copier.from("BILLING_ADDRESS").to("SHIPPING_ADDRESS");
//! copier.copy(CopySource::Value, None);
//! ```
//!
//! Valid sources are read in order and joined with the delimiter. Writable
//! destinations then receive the joined string according to the mode.

use tracing::debug;

use super::UiMapper;
use crate::ui::UiNode;

const DEFAULT_DELIMITER: &str = "\n";

/// Which representation of the sources is transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopySource {
    Value,
    Output,
    /// `to_text()`, caption included.
    Text,
}

/// How the transferred string lands in a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Only into destinations that are still invalid (empty).
    Copy,
    /// Append after the destination's value, separated by the delimiter.
    Join,
    /// Replace the destination's value.
    Overwrite,
}

/// Per-destination veto: `(destination, transferred) -> accept`.
pub type CopyFilter<'a> = &'a dyn Fn(&UiNode, &str) -> bool;

/// Copies values from one set of named nodes to another.
pub struct UiValueCopier {
    mapper: UiMapper,
    sources: Vec<UiNode>,
    destinations: Vec<UiNode>,
    delimiter: String,
}

impl UiValueCopier {
    pub fn new(mapper: UiMapper) -> Self {
        Self {
            mapper,
            sources: Vec::new(),
            destinations: Vec::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Use every node named `name` as a source.
    pub fn from(&mut self, name: &str) -> &mut Self {
        self.sources = self.mapper.get(name);
        self
    }

    /// Use every node named `name` as a destination.
    pub fn to(&mut self, name: &str) -> &mut Self {
        self.destinations = self.mapper.get(name);
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn set_delimiter(&mut self, delimiter: impl Into<String>) -> &mut Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn reset_delimiter(&mut self) -> &mut Self {
        self.delimiter = DEFAULT_DELIMITER.to_string();
        self
    }

    /// Forget sources and destinations, restore the default delimiter.
    pub fn reset(&mut self) -> &mut Self {
        self.sources.clear();
        self.destinations.clear();
        self.reset_delimiter()
    }

    pub fn copy(&self, what: CopySource, filter: Option<CopyFilter<'_>>) -> &Self {
        self.transfer(what, CopyMode::Copy, filter)
    }

    pub fn join(&self, what: CopySource, filter: Option<CopyFilter<'_>>) -> &Self {
        self.transfer(what, CopyMode::Join, filter)
    }

    pub fn overwrite(&self, what: CopySource, filter: Option<CopyFilter<'_>>) -> &Self {
        self.transfer(what, CopyMode::Overwrite, filter)
    }

    pub fn transfer(&self, what: CopySource, mode: CopyMode, filter: Option<CopyFilter<'_>>) -> &Self {
        if self.sources.is_empty() || self.destinations.is_empty() {
            debug!("copy skipped: no sources or destinations");
            return self;
        }

        let parts: Vec<String> = self
            .sources
            .iter()
            .filter(|source| source.is_valid())
            .map(|source| match what {
                CopySource::Value => source.value(),
                CopySource::Output => source.output(),
                CopySource::Text => source.to_text(),
            })
            .collect();
        if parts.is_empty() {
            debug!("copy skipped: no valid sources");
            return self;
        }
        let transferred = parts.join(&self.delimiter);

        for destination in &self.destinations {
            if !destination.is_writable() {
                continue;
            }
            if mode == CopyMode::Copy && destination.is_valid() {
                continue;
            }
            if let Some(accept) = filter {
                if !accept(destination, &transferred) {
                    continue;
                }
            }

            let value = match mode {
                CopyMode::Join if destination.is_valid() => {
                    format!("{}{}{}", destination.value(), self.delimiter, transferred)
                }
                _ => transferred.clone(),
            };
            destination.set_value(value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{TextParams, UiProps};

    fn setup() -> (UiMapper, UiNode, UiNode, UiNode) {
        let a = UiNode::text("First", "SRC");
        let b = UiNode::text("Second", "SRC");
        let dest = UiNode::text("Dest", "DEST");
        let mapper = UiMapper::new();
        mapper.add(&a).add(&b).add(&dest);
        (mapper, a, b, dest)
    }

    #[test]
    fn test_copy_joins_valid_sources_into_empty_destination() {
        let (mapper, a, b, dest) = setup();
        a.set_value("one");
        b.set_value("two");

        let mut copier = UiValueCopier::new(mapper);
        copier.from("SRC").to("DEST");
        copier.copy(CopySource::Value, None);
        assert_eq!(dest.value(), "one\ntwo");

        // Copy never touches a destination that already holds a value
        a.set_value("changed");
        copier.copy(CopySource::Value, None);
        assert_eq!(dest.value(), "one\ntwo");
    }

    #[test]
    fn test_join_appends_and_overwrite_replaces() {
        let (mapper, a, _b, dest) = setup();
        a.set_value("x");
        dest.set_value("start");

        let mut copier = UiValueCopier::new(mapper);
        copier.from("SRC").to("DEST").set_delimiter(" | ");
        copier.join(CopySource::Value, None);
        assert_eq!(dest.value(), "start | x");

        copier.overwrite(CopySource::Value, None);
        assert_eq!(dest.value(), "x");
    }

    #[test]
    fn test_text_mode_and_read_only_destinations() {
        let (mapper, a, _b, dest) = setup();
        a.set_value("v");

        let mut copier = UiValueCopier::new(mapper);
        copier.from("SRC").to("DEST");
        dest.forbid_write();
        copier.overwrite(CopySource::Text, None);
        assert_eq!(dest.value(), "");

        dest.permit_write();
        copier.overwrite(CopySource::Text, None);
        assert_eq!(dest.value(), "First:v");
    }

    #[test]
    fn test_filter_vetoes_destinations() {
        let a = UiNode::text("A", "SRC");
        let short = UiNode::text_with(
            UiProps::new("Short", "DEST"),
            TextParams {
                max_length: Some(3),
                ..Default::default()
            },
        );
        let long = UiNode::text("Long", "DEST");
        let mapper = UiMapper::new();
        mapper.add(&a).add(&short).add(&long);
        a.set_value("lengthy");

        let fits = |dest: &UiNode, value: &str| dest.max_length().is_none_or(|max| value.len() <= max);
        let mut copier = UiValueCopier::new(mapper);
        copier.from("SRC").to("DEST");
        copier.copy(CopySource::Output, Some(&fits));

        assert_eq!(short.value(), "");
        assert_eq!(long.value(), "lengthy");
    }

    #[test]
    fn test_reset_forgets_targets() {
        let (mapper, a, _b, dest) = setup();
        a.set_value("v");

        let mut copier = UiValueCopier::new(mapper);
        copier.from("SRC").to("DEST").set_delimiter(",");
        copier.reset();
        assert_eq!(copier.delimiter(), "\n");

        copier.copy(CopySource::Value, None);
        assert_eq!(dest.value(), "");
    }
}
