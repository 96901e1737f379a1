//! Error types.
//!
//! Ordinary invalid input never produces an error: node and repository
//! operations silently ignore it. These types cover what does surface:
//! caller-supplied callbacks failing, load timeouts, structural mistakes
//! made while building a tree and unknown request types.

use thiserror::Error;

/// Failure reported by a caller-supplied policy, rule or setter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("{0}")]
    Message(String),
}

impl PolicyError {
    pub fn new(message: impl Into<String>) -> Self {
        PolicyError::Message(message.into())
    }
}

impl From<&str> for PolicyError {
    fn from(message: &str) -> Self {
        PolicyError::new(message)
    }
}

impl From<String> for PolicyError {
    fn from(message: String) -> Self {
        PolicyError::Message(message)
    }
}

/// Failure of the repository policy pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("filter policy #{stage} failed: {source}")]
    Filter { stage: usize, source: PolicyError },
}

/// Terminal failure of a deferred load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("load timed out")]
    Timeout,
    #[error("load failed: {0}")]
    Failed(String),
}

/// Programming error detected while constructing a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("option `{caption}` has an empty option value")]
    EmptyOptionValue { caption: String },
}

/// Request type not present in the handler table's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown request type `{0}`")]
pub struct UnknownRequestKind(pub String);
