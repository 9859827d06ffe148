//! Read-only reports over a scene document.
//!
//! Everything here is derived from [`SceneDocument::traverse`] and prim
//! attributes; nothing mutates the document.

use std::collections::BTreeMap;

use crate::error::{Result, SceneError};
use crate::layer::Value;
use crate::mesh::{Orientation, SubdivisionScheme};
use crate::scene::{attr, AttributeValue, Prim, PrimKind, SceneDocument};

/// One line of a hierarchy listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEntry {
    /// Number of path segments minus one.
    pub depth: usize,
    pub name: String,
    pub kind: PrimKind,
    pub path: String,
}

/// Size and interpretation of one mesh prim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSummary {
    pub vertex_count: usize,
    pub face_count: usize,
    pub orientation: Option<Orientation>,
    pub subdivision_scheme: Option<SubdivisionScheme>,
}

/// Totals over a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentSummary {
    pub prim_count: usize,
    pub mesh_count: usize,
    pub vertex_count: usize,
    pub face_count: usize,
}

/// List every prim in traversal order.
pub fn describe_hierarchy(doc: &SceneDocument) -> Vec<HierarchyEntry> {
    doc.traverse()
        .map(|prim| HierarchyEntry {
            depth: prim.depth(),
            name: prim.name().to_string(),
            kind: prim.kind(),
            path: prim.path().to_string(),
        })
        .collect()
}

/// Count the vertices and faces of a mesh prim.
///
/// A mesh without geometry arrays reports zero for both.
pub fn summarize_mesh(prim: &Prim) -> Result<MeshSummary> {
    if prim.kind() != PrimKind::Mesh {
        return Err(SceneError::WrongPrimKind {
            path: prim.path().to_string(),
            expected: PrimKind::Mesh,
            found: prim.kind(),
        });
    }
    Ok(MeshSummary {
        vertex_count: prim
            .attribute(attr::POINTS)
            .and_then(AttributeValue::as_points)
            .map_or(0, <[_]>::len),
        face_count: prim
            .attribute(attr::FACE_VERTEX_COUNTS)
            .and_then(AttributeValue::as_uints)
            .map_or(0, <[_]>::len),
        orientation: prim.orientation(),
        subdivision_scheme: prim.subdivision_scheme(),
    })
}

/// Totals over every prim in the document.
pub fn summarize_document(doc: &SceneDocument) -> DocumentSummary {
    let mut summary = DocumentSummary::default();
    for prim in doc.traverse() {
        summary.prim_count += 1;
        if let Ok(mesh) = summarize_mesh(prim) {
            summary.mesh_count += 1;
            summary.vertex_count += mesh.vertex_count;
            summary.face_count += mesh.face_count;
        }
    }
    summary
}

/// Flatten custom layer data into `(dotted.key, rendered value)` pairs,
/// sorted by key.
///
/// Nested maps contribute one entry per leaf. Lists and empty maps are
/// rendered whole.
pub fn metadata_entries(doc: &SceneDocument) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    flatten_into(doc.custom_layer_data(), "", &mut entries);
    entries
}

fn flatten_into(map: &BTreeMap<String, Value>, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in map {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Map(inner) if !inner.is_empty() => flatten_into(inner, &full_key, out),
            _ => out.push((full_key, value.to_string())),
        }
    }
}
