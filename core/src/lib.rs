//! # primstage core
//!
//! Parametric primitive meshes and a minimal hierarchical scene document.
//!
//! - [`mesh`] - Geometry buffers and the cone, UV sphere and icosphere
//!   generators
//! - [`scene`] - The prim hierarchy with typed attributes and custom layer data
//! - [`layer`] - Saving and opening documents through a storage provider
//! - [`inspect`] - Hierarchy, mesh and metadata reports
//! - [`usda`] - USD ASCII export

pub mod error;
pub mod inspect;
pub mod layer;
pub mod math;
pub mod mesh;
pub mod scene;
pub mod usda;

pub use error::{Result, SceneError};
pub use layer::{LayerFormat, Value};
pub use scene::{PrimKind, SceneDocument};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
