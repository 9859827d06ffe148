//! Provider-relative paths.
//!
//! Layers are addressed by file paths such as `layers/cone.pstage`, relative
//! to a provider's root. [`StoragePath::file`] accepts a path only if it
//! names a file: the last segment is the file name and the path may not end
//! in a separator. [`StoragePath::dir`] accepts directory paths, including
//! the empty root.

use std::fmt;

use crate::StorageError;

/// Prefix of the hidden siblings used for in-flight atomic writes.
pub(crate) const TEMP_PREFIX: &str = ".pstage-tmp-";

/// A validated provider-relative path.
///
/// Stored with forward slashes, without leading separators, empty segments
/// or `.` segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath {
    normalized: String,
}

impl StoragePath {
    /// Parse a path that must name a file.
    ///
    /// Backslashes count as separators and leading separators are ignored.
    /// Rejected: empty paths, a trailing separator, `..` segments, control
    /// characters, and file names reserved for in-flight writes.
    pub fn file(path: &str) -> Result<Self, StorageError> {
        let invalid = |reason| StorageError::InvalidPath {
            path: path.to_owned(),
            reason,
        };
        if path.ends_with(['/', '\\']) {
            return Err(invalid("path ends in a separator and names no file"));
        }
        let parsed = Self::dir(path)?;
        if parsed.is_root() {
            return Err(invalid("path names no file"));
        }
        if parsed.file_name().starts_with(TEMP_PREFIX) {
            return Err(invalid("file name is reserved for in-flight writes"));
        }
        Ok(parsed)
    }

    /// Parse a directory path. The empty path is the provider root.
    pub fn dir(path: &str) -> Result<Self, StorageError> {
        let invalid = |reason| StorageError::InvalidPath {
            path: path.to_owned(),
            reason,
        };
        let mut segments = Vec::new();
        for segment in path.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => return Err(invalid("`..` segments are not allowed")),
                _ if segment.chars().any(char::is_control) => {
                    return Err(invalid("control characters are not allowed"))
                }
                _ => segments.push(segment),
            }
        }
        Ok(Self {
            normalized: segments.join("/"),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Whether this is the provider root.
    pub fn is_root(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Directory part; empty for top-level files.
    pub fn parent(&self) -> &str {
        self.normalized
            .rfind('/')
            .map_or("", |pos| &self.normalized[..pos])
    }

    /// Last segment.
    pub fn file_name(&self) -> &str {
        self.normalized
            .rfind('/')
            .map_or(self.normalized.as_str(), |pos| &self.normalized[pos + 1..])
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}
