//! Layer persistence for scene documents.
//!
//! A layer is the stored form of a [`SceneDocument`]: its custom layer data
//! plus the full prim tree (names, kinds, attributes, child order).
//!
//! # Encodings
//!
//! - [`LayerFormat::Text`] - `#primstage 1.0` header line, then pretty RON
//! - `LayerFormat::Binary` - `PSTGBIN\0` magic, `u32` version, then bincode
//!   (feature `binary-layers`)
//!
//! [`SceneDocument::open`] sniffs the header, so callers never pick the
//! decoder themselves.
//!
//! # Storage
//!
//! [`SceneDocument::save_to`] and [`SceneDocument::open_from`] work against
//! any [`StorageProvider`]. [`SceneDocument::save`] and
//! [`SceneDocument::open`] are shorthands for a native path and go through
//! [`FileSystemStorage`], whose writes are atomic.

mod format;
mod nesting;
mod serialized;
#[cfg(test)]
mod tests;
mod value;

pub use format::{detect_format, LayerFormat, BINARY_MAGIC, BINARY_VERSION, TEXT_HEADER};
pub use nesting::MAX_VALUE_DEPTH;
pub use value::Value;

use std::path::Path;

use primstage_storage::{FileSystemStorage, StorageProvider};

use crate::error::{Result, SceneError};
use crate::scene::SceneDocument;

use serialized::SerializedLayer;

fn native_target(path: &Path) -> Result<(FileSystemStorage, String)> {
    FileSystemStorage::for_file(path).map_err(|e| SceneError::io(path.display().to_string(), e))
}

impl SceneDocument {
    /// Encode the document without writing it anywhere.
    ///
    /// Fails with [`SceneError::Encode`] for documents that could not be
    /// opened again: a mesh whose face-vertex arrays are incomplete or
    /// invalid, a non-finite number, or metadata nested deeper than
    /// [`MAX_VALUE_DEPTH`].
    pub fn to_bytes(&self, format: LayerFormat) -> Result<Vec<u8>> {
        format::encode(&SerializedLayer::from_document(self)?, format)
    }

    /// Decode a document from layer bytes in any supported encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        format::decode(bytes)?.into_document()
    }

    /// Save as a text layer at a native path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_as(path, LayerFormat::Text)
    }

    /// Save at a native path in the given encoding.
    pub fn save_as(&self, path: impl AsRef<Path>, format: LayerFormat) -> Result<()> {
        let (storage, name) = native_target(path.as_ref())?;
        self.save_to(&storage, &name, format)
    }

    /// Save through a storage provider.
    ///
    /// Either the whole layer is written or the call fails; providers never
    /// expose a partial file.
    pub fn save_to(
        &self,
        storage: &dyn StorageProvider,
        path: &str,
        format: LayerFormat,
    ) -> Result<()> {
        let bytes = self.to_bytes(format)?;
        storage
            .write(path, &bytes)
            .map_err(|e| SceneError::io(path, e))?;
        log::info!(
            "Saved {} layer {path} ({} prims)",
            format.name(),
            self.prim_count()
        );
        log::debug!("Layer {path}: {} bytes", bytes.len());
        Ok(())
    }

    /// Open a layer from a native path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let (storage, name) = native_target(path.as_ref())?;
        Self::open_from(&storage, &name)
    }

    /// Open a layer through a storage provider.
    pub fn open_from(storage: &dyn StorageProvider, path: &str) -> Result<Self> {
        let bytes = storage.read(path).map_err(|e| SceneError::io(path, e))?;
        log::debug!("Read {} bytes from {path}", bytes.len());
        let doc = Self::from_bytes(&bytes)?;
        log::info!("Opened layer {path} ({} prims)", doc.prim_count());
        Ok(doc)
    }
}
