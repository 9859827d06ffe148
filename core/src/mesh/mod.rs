//! Face-vertex meshes and the generators that produce them.
//!
//! - [`GeometryBuffer`] - Points plus run-length-counted face loops
//! - [`Orientation`] / [`SubdivisionScheme`] - Mesh interpretation tokens
//! - [`generators`] - Cone, UV sphere and icosphere builders

mod data;
pub mod generators;

pub use data::{Faces, GeometryBuffer, Orientation, SubdivisionScheme};
pub use generators::{
    generate_cone, generate_icosphere_approx, generate_uv_sphere, GENERATED_ORIENTATION,
    MAX_ICOSPHERE_SUBDIVISION, MAX_RESOLUTION, MIN_RESOLUTION,
};
