//! Scene document model.
//!
//! - [`SceneDocument`] - Arena of prims plus custom layer data
//! - [`Prim`] / [`PrimId`] / [`PrimKind`] - Nodes of the hierarchy
//! - [`AttributeValue`] - Typed prim attribute values
//! - [`NodeTransform`] - TRS transform using plain arrays
//!
//! Persistence lives in [`crate::layer`].

mod document;
pub mod path;
mod types;

pub use document::{SceneDocument, Traverse};
pub use types::{attr, AttributeValue, NodeTransform, Prim, PrimId, PrimKind};
