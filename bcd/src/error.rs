//! Error Types
//!
//! Every fallible operation in the crate returns [`Result`]. The variants
//! mirror the registry status codes a caller can act on: a missing key is
//! `NotFound`, a store that is present but structurally wrong is `Schema`.

use thiserror::Error;

use crate::value::RegType;

/// Crate-wide result alias
pub type Result<T, E = BcdError> = core::result::Result<T, E>;

/// BCD store errors
#[derive(Debug, Error)]
pub enum BcdError {
    /// Object, key or value is absent
    #[error("not found: {0}")]
    NotFound(String),

    /// A required structural value is missing or has the wrong kind
    #[error("schema error: {0}")]
    Schema(String),

    /// Decode requested for a kind the element does not carry
    #[error("kind mismatch: expected {expected}, found {actual}")]
    KindMismatch { expected: RegType, actual: RegType },

    /// Malformed UTF-16LE payload
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Fixed-width payload of the wrong size
    #[error("invalid {kind} length: expected {expected} bytes, found {actual}")]
    InvalidLength {
        kind: RegType,
        expected: usize,
        actual: usize,
    },

    /// Element key is not an 8-digit hexadecimal code
    #[error("invalid element key {0:?}")]
    InvalidElementKey(String),

    /// Mutation attempted without write access
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Hive image could not be read or written
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Hive image is not valid JSON or has an unexpected shape
    #[error("invalid hive image: {0}")]
    Image(#[from] serde_json::Error),
}

impl BcdError {
    /// True for errors that describe a structurally broken store
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// True for errors that describe an absent object, key or value
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
