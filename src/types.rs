//! Core types shared across the framework.
//!
//! - [`Payload`] - the wire format exchanged with the request/response layer
//! - [`ResourceState`] - snapshot of a resource's three flags
//! - Status enums for repositories and documents

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Wire Format
// =============================================================================

/// Maximum number of characters carried by a single wire segment.
pub const SEGMENT_LENGTH: usize = 1000;

/// Ordered string chunks representing one node's value on the wire.
pub type Segments = Vec<String>;

/// Request/response payload keyed by node name.
///
/// ```text
/// { "<fieldName>": ["segment0", "segment1", ...], ... }
/// ```
///
/// Scalar fields carry a single segment. Long text is split at
/// [`SEGMENT_LENGTH`] boundaries, list fields carry one segment per item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Segments>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a payload from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render the payload as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Set the segments for `name`, returning the previous ones.
    pub fn insert(&mut self, name: impl Into<String>, segments: Segments) -> Option<Segments> {
        self.0.insert(name.into(), segments)
    }

    pub fn remove(&mut self, name: &str) -> Option<Segments> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: Into<String>> FromIterator<(K, Segments)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, Segments)>>(iter: I) -> Self {
        Payload(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// =============================================================================
// Resource State (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Snapshot of the three resource flags.
    ///
    /// Combine with bitwise OR: `ResourceState::AVAILABLE | ResourceState::VISIBLE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ResourceState: u8 {
        const NONE = 0;
        const AVAILABLE = 1 << 0;
        const VALID = 1 << 1;
        const VISIBLE = 1 << 2;
    }
}

// =============================================================================
// Status Enums
// =============================================================================

/// Load status of a master repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepositoryStatus {
    #[default]
    Ready,
    Loading,
    Loaded,
    Timeout,
}

/// Load status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentStatus {
    #[default]
    Ready,
    Loading,
    Done,
    Timeout,
    Error,
}

// =============================================================================
// Tests
// =============================================================================
