//! Error type shared by generators, the scene document, and layer I/O.

use primstage_storage::StorageError;

use crate::scene::PrimKind;

/// Errors produced by primstage core operations.
///
/// Every failure is surfaced to the caller; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// A generator precondition was violated.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An operation was applied to a prim of the wrong kind.
    #[error("prim {path} is {found:?}, expected {expected:?}")]
    WrongPrimKind {
        path: String,
        expected: PrimKind,
        found: PrimKind,
    },

    /// A path is already defined with a different kind.
    #[error("prim {path} is already defined as {existing:?}, cannot redefine as {requested:?}")]
    PathConflict {
        path: String,
        existing: PrimKind,
        requested: PrimKind,
    },

    /// A prim path is malformed.
    #[error("invalid prim path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// No prim is defined at the given path.
    #[error("no prim at {0}")]
    PrimNotFound(String),

    /// Stored layer content could not be decoded.
    #[error("parse error{}: {reason}", .location.as_ref().map(|l| format!(" at {l}")).unwrap_or_default())]
    Parse {
        reason: String,
        location: Option<String>,
    },

    /// The storage layer failed to read or write.
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: StorageError,
    },

    /// The document could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),
}

impl SceneError {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
            location: None,
        }
    }

    pub(crate) fn io(path: impl Into<String>, source: StorageError) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SceneError>;
