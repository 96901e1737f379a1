//! Wire format conversion.
//!
//! Every named node reads and writes its value as a list of string
//! segments under its name in a [`Payload`]:
//!
//! | Kind      | write                              | read                          |
//! |-----------|------------------------------------|-------------------------------|
//! | Text      | chunks of `SEGMENT_LENGTH`         | join with the text delimiter  |
//! | List      | one segment per item               | join with the list delimiter  |
//! | CheckBox  | one segment per checked value      | join with the delimiter       |
//! | Option    | first segment, only if still empty | first segment                 |
//! | others    | first segment                      | first segment                 |
//!
//! An empty value is always written as a single empty segment.

use tracing::trace;

use super::{text, NodeKind, UiNode};
use crate::types::{Payload, Segments, SEGMENT_LENGTH};

impl UiNode {
    /// Write `segments` through the value path, then commit.
    pub fn read_data(&self, segments: &[String]) -> &Self {
        let value = match &self.inner.kind {
            NodeKind::Group(_) => return self,
            NodeKind::Text(params) => join_non_empty(segments.iter().cloned(), &params.delimiter),
            NodeKind::CheckBox(c) => join_non_empty(segments.iter().cloned(), &c.delimiter),
            NodeKind::List(l) => join_non_empty(
                segments.iter().map(|segment| l.strip(segment)),
                l.delimiter(),
            ),
            _ => segments.first().cloned().unwrap_or_default(),
        };

        self.set_value(value);
        self.commit()
    }

    /// Segments for the current value. `seed` is the entry already present
    /// under this node's name, if any.
    pub fn write_data(&self, seed: Segments) -> Segments {
        let value = self.value();
        match &self.inner.kind {
            NodeKind::Group(_) => seed,
            NodeKind::Text(_) => text::chunk_segments(&value, SEGMENT_LENGTH),
            NodeKind::List(l) => or_empty(
                value
                    .split(l.delimiter())
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            NodeKind::CheckBox(c) => or_empty(c.checked_values()),
            NodeKind::Option(_) => {
                let mut segments = or_empty(seed);
                if segments[0].is_empty() {
                    segments[0] = value;
                }
                segments
            }
            _ => {
                let mut segments = or_empty(seed);
                segments[0] = value;
                segments
            }
        }
    }

    /// Read this node's entry from `payload`, then every child's.
    pub fn import_data(&self, payload: &Payload) -> &Self {
        if !self.inner.name.is_empty() {
            match payload.get(&self.inner.name) {
                Some(segments) => {
                    self.read_data(segments);
                }
                None => trace!(node = %self.name(), "no payload entry"),
            }
        }
        for child in self.children() {
            child.import_data(payload);
        }
        self
    }

    /// Write this node's entry into `payload`, then every child's.
    pub fn export_data(&self, payload: &mut Payload) -> &Self {
        if !self.inner.name.is_empty() && !matches!(self.inner.kind, NodeKind::Group(_)) {
            let seed = payload.remove(&self.inner.name).unwrap_or_default();
            let segments = self.write_data(seed);
            payload.insert(self.inner.name.clone(), segments);
        }
        for child in self.children() {
            child.export_data(payload);
        }
        self
    }
}

fn join_non_empty(segments: impl Iterator<Item = String>, delimiter: &str) -> String {
    segments
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(delimiter)
}

fn or_empty(segments: Segments) -> Segments {
    if segments.is_empty() {
        vec![String::new()]
    } else {
        segments
    }
}

// =============================================================================
// Tests
// =============================================================================
