use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::path::{StoragePath, TEMP_PREFIX};
use crate::provider::StorageProvider;
use crate::StorageError;

/// Monotonic suffix so concurrent writers never share a temporary file.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File system provider for reading and writing layers on disk.
///
/// The root path is joined with the normalized storage path to form the
/// actual filesystem path. Path traversal is prevented by normalization,
/// which rejects `..` segments before they reach the filesystem.
///
/// Writes go to a temporary sibling file first and are renamed over the
/// destination once fully flushed, so a failed write never leaves a
/// truncated file behind.
///
/// # Example
///
/// ```ignore
/// let storage = FileSystemStorage::new("./primstage_output");
/// storage.write("cone.pstage", &bytes)?;
/// let bytes = storage.read("cone.pstage")?;
/// ```
pub struct FileSystemStorage {
    root: PathBuf,
}

impl FileSystemStorage {
    /// Create a provider rooted at the given directory.
    ///
    /// The directory does not need to exist yet. It is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Split a native file path into a provider rooted at its directory and
    /// the file name inside it. A bare file name is rooted at `.`.
    pub fn for_file(path: &Path) -> Result<(Self, String), StorageError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StorageError::InvalidPath {
                path: path.display().to_string(),
                reason: "path does not name a file",
            })?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((Self::new(dir), name.to_owned()))
    }

    /// The directory this provider is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &StoragePath) -> PathBuf {
        self.root.join(path.as_str())
    }
}

impl StorageProvider for FileSystemStorage {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let path = StoragePath::file(path)?;
        std::fs::read(self.full_path(&path)).map_err(|e| StorageError::io(path.as_str(), e))
    }

    fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let path = StoragePath::file(path)?;
        Ok(self.full_path(&path).is_file())
    }

    fn list_dir(&self, path: &str) -> Result<Vec<String>, StorageError> {
        let dir = StoragePath::dir(path)?;
        let full_path = self.full_path(&dir);
        if !full_path.is_dir() {
            return Ok(Vec::new());
        }
        let io_err = |e| StorageError::io(dir.as_str(), e);
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(full_path).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with(TEMP_PREFIX) {
                    entries.push(name.to_owned());
                }
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn write(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = StoragePath::file(path)?;
        let full_path = self.full_path(&path);
        let parent = self.root.join(path.parent());
        let io_err = |e| StorageError::io(path.as_str(), e);
        std::fs::create_dir_all(&parent).map_err(io_err)?;

        let temp_path = parent.join(format!(
            "{TEMP_PREFIX}{}-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
            path.file_name()
        ));

        let written = (|| -> std::io::Result<()> {
            let mut file = std::fs::File::create(&temp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
            std::fs::rename(&temp_path, &full_path)
        })();

        if let Err(err) = written {
            log::warn!("Write to {} failed: {err}", full_path.display());
            let _ = std::fs::remove_file(&temp_path);
            return Err(io_err(err));
        }

        log::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), StorageError> {
        let path = StoragePath::file(path)?;
        std::fs::remove_file(self.full_path(&path)).map_err(|e| StorageError::io(path.as_str(), e))
    }
}
