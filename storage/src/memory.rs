use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::path::StoragePath;
use crate::provider::StorageProvider;
use crate::StorageError;

/// In-memory storage provider for tests and embedded layers.
///
/// Cloning shares the underlying map, so a clone handed to a document can be
/// inspected afterwards. Directories are implicit: they exist whenever a
/// file path contains that directory prefix.
///
/// # Example
///
/// ```ignore
/// let mem = MemoryStorage::new();
/// doc.save_to(&mem, "scenes/cone.pstage", LayerFormat::Text)?;
/// assert!(mem.contains("scenes/cone.pstage"));
/// ```
#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    /// Create an empty in-memory provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file at the given (already normalized) path.
    ///
    /// Overwrites any existing file at the same path. Unlike
    /// [`write`](StorageProvider::write) the path is stored verbatim.
    pub fn insert(&self, path: impl Into<String>, data: Vec<u8>) {
        self.files.write().insert(path.into(), data);
    }

    /// Whether a file is stored at the given path.
    pub fn contains(&self, path: &str) -> bool {
        StoragePath::file(path)
            .map(|p| self.files.read().contains_key(p.as_str()))
            .unwrap_or(false)
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Whether no files are stored.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl StorageProvider for MemoryStorage {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let path = StoragePath::file(path)?;
        self.files
            .read()
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            })
    }

    fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let path = StoragePath::file(path)?;
        Ok(self.files.read().contains_key(path.as_str()))
    }

    fn list_dir(&self, path: &str) -> Result<Vec<String>, StorageError> {
        let dir = StoragePath::dir(path)?;
        let prefix = if dir.is_root() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let mut children = BTreeSet::new();
        for key in self.files.read().keys() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                let child = match rest.find('/') {
                    Some(pos) => &rest[..pos],
                    None => rest,
                };
                if !child.is_empty() {
                    children.insert(child.to_owned());
                }
            }
        }
        Ok(children.into_iter().collect())
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn write(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = StoragePath::file(path)?;
        log::trace!("MemoryStorage: write {} bytes to {path}", data.len());
        self.files.write().insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), StorageError> {
        let path = StoragePath::file(path)?;
        self.files
            .write()
            .remove(path.as_str())
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_existing_file() {
        let mem = MemoryStorage::new();
        mem.insert("layer.pstage", b"#primstage 1.0".to_vec());
        assert_eq!(mem.read("layer.pstage").unwrap(), b"#primstage 1.0");
    }

    #[test]
    fn read_missing_file() {
        let mem = MemoryStorage::new();
        assert!(matches!(
            mem.read("/nope.txt"),
            Err(StorageError::NotFound { path }) if path == "nope.txt"
        ));
    }

    #[test]
    fn write_normalizes_paths() {
        let mem = MemoryStorage::new();
        mem.write("/scenes//cone.pstage", b"x").unwrap();
        assert!(mem.contains("scenes/cone.pstage"));
        assert!(mem.exists("scenes/cone.pstage").unwrap());
    }

    #[test]
    fn write_requires_a_file_name() {
        let mem = MemoryStorage::new();
        assert!(matches!(
            mem.write("scenes/", b"x"),
            Err(StorageError::InvalidPath { .. })
        ));
        assert!(mem.is_empty());
    }

    #[test]
    fn clones_share_contents() {
        let mem = MemoryStorage::new();
        let clone = mem.clone();
        clone.write("a.txt", b"1").unwrap();
        assert_eq!(mem.len(), 1);
    }

    #[test]
    fn list_dir_root_and_nested() {
        let mem = MemoryStorage::new();
        mem.insert("a.txt", vec![]);
        mem.insert("b/c.txt", vec![]);
        mem.insert("b/d.txt", vec![]);

        assert_eq!(mem.list_dir("").unwrap(), vec!["a.txt", "b"]);
        assert_eq!(mem.list_dir("b").unwrap(), vec!["c.txt", "d.txt"]);
        assert!(mem.list_dir("missing").unwrap().is_empty());
    }

    #[test]
    fn delete_removes_file() {
        let mem = MemoryStorage::new();
        mem.insert("a.txt", vec![1]);
        mem.delete("a.txt").unwrap();
        assert!(mem.is_empty());
        assert!(mem.delete("a.txt").is_err());
    }
}
