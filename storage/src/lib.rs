//! Storage abstraction for primstage layers.
//!
//! Scene documents never touch `std::fs` directly. They read and write whole
//! byte buffers through the [`StorageProvider`] trait, which keeps the core
//! free of process-wide state (no implicit working directory or output
//! folder) and lets tests run against memory.
//!
//! # Providers
//!
//! - [`FileSystemStorage`] - Native filesystem rooted at a directory, with
//!   atomic (temp file + rename) writes
//! - [`MemoryStorage`] - In-memory storage for tests and embedded layers
//!
//! All operations are blocking and complete before returning.
//!
//! # Read-Only vs Read-Write
//!
//! All providers must implement read operations. Write operations are optional
//! and default to returning [`StorageError::ReadOnly`]. Use
//! [`StorageProvider::is_read_only()`] to check capability.

mod error;
#[cfg(feature = "filesystem")]
mod filesystem;
mod memory;
pub mod path;
mod provider;

pub use error::StorageError;
#[cfg(feature = "filesystem")]
pub use filesystem::FileSystemStorage;
pub use memory::MemoryStorage;
pub use path::StoragePath;
pub use provider::StorageProvider;
