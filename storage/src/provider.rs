use crate::StorageError;

/// Trait for storage backends.
///
/// Providers move whole byte buffers; parsing and encoding happen above this
/// layer. Every call blocks until the operation has finished.
///
/// # Read vs Write
///
/// All providers must implement read operations (`read`, `exists`, `list_dir`).
/// Write operations (`write`, `delete`) have default implementations that
/// return [`StorageError::ReadOnly`]. Providers that support writes override
/// these methods and return `false` from
/// [`is_read_only()`](StorageProvider::is_read_only).
///
/// # Path Contract
///
/// File arguments are parsed with [`StoragePath::file`](crate::StoragePath::file)
/// and directory arguments with [`StoragePath::dir`](crate::StoragePath::dir)
/// before they reach provider internals, so providers only ever see
/// normalized paths relative to their root.
pub trait StorageProvider: Send + Sync {
    // --- Read operations (required) ---

    /// Read the entire contents of a file at the given path.
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether a file exists at the given path.
    fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// List the immediate children of a directory, sorted by name.
    ///
    /// Returns file and directory names (not full paths).
    /// Returns an empty vec for non-existent directories.
    fn list_dir(&self, path: &str) -> Result<Vec<String>, StorageError>;

    // --- Write operations (optional, default returns ReadOnly) ---

    /// Whether this provider is read-only.
    fn is_read_only(&self) -> bool {
        true
    }

    /// Write data to a file, creating or replacing it.
    ///
    /// Implementations must not leave a partially written file at `path`:
    /// either the full buffer is visible afterwards or the previous contents
    /// (or absence) are.
    fn write(&self, _path: &str, _data: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly)
    }

    /// Delete a file at the given path.
    fn delete(&self, _path: &str) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly)
    }
}
