//! Error types for registration and decoding.

use telepath_value::ConversionError;
use thiserror::Error;

use crate::wire::NodeId;

/// Errors raised while building a registry. These are programming errors
/// and should abort startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate type tag: {0}")]
    DuplicateTag(String),

    #[error("Type tag must not be empty")]
    EmptyTag,

    #[error("A process-wide registry is already installed")]
    AlreadyInstalled,
}

/// Errors raised by a decode call. Any of them fails the whole call; no
/// partial value is returned.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The payload is not valid JSON, or violates the wire grammar.
    #[error("Malformed payload at {path}: {reason}")]
    Malformed { path: String, reason: String },

    /// A tagged node names a type with no registered adapter.
    #[error("Unknown type tag: {0}")]
    UnknownTag(String),

    /// A reference points at a node that has not been built (yet).
    #[error("Dangling reference to node {0}")]
    DanglingReference(NodeId),

    /// An adapter rule rejected its arguments.
    #[error("Adapter '{tag}' failed: {source}")]
    Adapter {
        tag: String,
        #[source]
        source: ConversionError,
    },

    #[error("No process-wide registry installed")]
    NoRegistry,
}

impl DecodeError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DecodeError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::malformed(
            format!("line {}, column {}", e.line(), e.column()),
            e.to_string(),
        )
    }
}
