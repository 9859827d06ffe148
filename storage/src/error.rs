use std::io;

/// Failure of a storage provider operation.
///
/// Every variant that concerns a file carries the provider-relative path it
/// was asked for.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Nothing is stored at `path`.
    #[error("no file at {path}")]
    NotFound { path: String },

    /// The backing store failed while accessing `path`.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// `path` is not a usable storage path.
    #[error("invalid storage path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The provider does not accept writes.
    #[error("provider is read-only")]
    ReadOnly,
}

impl StorageError {
    /// Attribute an I/O error to `path`, keeping "not found" distinct.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// The path the failure concerns, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::NotFound { path } | Self::Io { path, .. } | Self::InvalidPath { path, .. } => {
                Some(path)
            }
            Self::ReadOnly => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_keeps_the_requested_path() {
        let err = StorageError::io("layers/cone.pstage", io::ErrorKind::NotFound.into());
        assert!(matches!(&err, StorageError::NotFound { path } if path == "layers/cone.pstage"));
        assert_eq!(err.to_string(), "no file at layers/cone.pstage");
    }

    #[test]
    fn other_io_errors_are_wrapped() {
        let err = StorageError::io(
            "cone.pstage",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, StorageError::Io { .. }));
        assert_eq!(err.path(), Some("cone.pstage"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
