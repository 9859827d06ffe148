//! The in-memory scene document.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, SceneError};
use crate::layer::Value;
use crate::mesh::{GeometryBuffer, Orientation, SubdivisionScheme};

use super::path::{self, ROOT_PATH};
use super::types::{attr, AttributeValue, NodeTransform, Prim, PrimId, PrimKind};

/// A hierarchy of prims plus document-level custom layer data.
///
/// Prims live in an arena owned by the document and are addressed by
/// [`PrimId`] or by absolute path. The synthetic root `/` is not a prim;
/// its children are kept in insertion order like every other child list.
///
/// Documents compare equal when their traversals match prim for prim
/// (name, path, kind, attributes) and their custom layer data match. Arena
/// layout is not compared.
#[derive(Debug, Clone, Default)]
pub struct SceneDocument {
    prims: Vec<Prim>,
    by_path: HashMap<String, PrimId>,
    root_children: Vec<PrimId>,
    custom_layer_data: BTreeMap<String, Value>,
}

impl SceneDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a prim at `path`, creating missing ancestors as `Xform` prims.
    ///
    /// Redefining an existing path with the same kind returns the existing
    /// prim. A different kind fails with [`SceneError::PathConflict`].
    /// Existing ancestors are reused whatever their kind.
    pub fn define_prim(&mut self, path: &str, kind: PrimKind) -> Result<PrimId> {
        let segments = path::segments(path)?;
        let (leaf, ancestors) = match segments.split_last() {
            Some(split) => split,
            None => {
                return Err(SceneError::InvalidPath {
                    path: path.to_string(),
                    reason: "no segments".to_string(),
                })
            }
        };

        let mut parent = None;
        let mut current = ROOT_PATH.to_string();
        for name in ancestors {
            current = path::join(&current, name);
            let id = match self.by_path.get(&current) {
                Some(&id) => id,
                None => self.insert_child(parent, name, current.clone(), PrimKind::Xform),
            };
            parent = Some(id);
        }

        let leaf_path = path::join(&current, leaf);
        if let Some(&id) = self.by_path.get(&leaf_path) {
            let existing = self.prims[id.0].kind;
            if existing != kind {
                return Err(SceneError::PathConflict {
                    path: leaf_path,
                    existing,
                    requested: kind,
                });
            }
            return Ok(id);
        }

        let id = self.insert_child(parent, leaf, leaf_path, kind);
        log::trace!("Defined {:?} prim {}", kind, self.prims[id.0].path);
        Ok(id)
    }

    fn insert_child(
        &mut self,
        parent: Option<PrimId>,
        name: &str,
        path: String,
        kind: PrimKind,
    ) -> PrimId {
        let id = PrimId(self.prims.len());
        self.prims.push(Prim {
            name: name.to_string(),
            path: path.clone(),
            kind,
            parent,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        });
        self.by_path.insert(path, id);
        match parent {
            Some(parent) => self.prims[parent.0].children.push(id),
            None => self.root_children.push(id),
        }
        id
    }

    /// Look up a prim by id.
    pub fn prim(&self, id: PrimId) -> Option<&Prim> {
        self.prims.get(id.0)
    }

    /// Look up a prim id by absolute path.
    pub fn prim_at_path(&self, path: &str) -> Option<PrimId> {
        self.by_path.get(path).copied()
    }

    fn get(&self, id: PrimId) -> Result<&Prim> {
        self.prims
            .get(id.0)
            .ok_or_else(|| SceneError::PrimNotFound(format!("#{}", id.0)))
    }

    fn get_mut(&mut self, id: PrimId) -> Result<&mut Prim> {
        self.prims
            .get_mut(id.0)
            .ok_or_else(|| SceneError::PrimNotFound(format!("#{}", id.0)))
    }

    fn expect_kind(&self, id: PrimId, expected: PrimKind) -> Result<&Prim> {
        let prim = self.get(id)?;
        if prim.kind != expected {
            return Err(SceneError::WrongPrimKind {
                path: prim.path.clone(),
                expected,
                found: prim.kind,
            });
        }
        Ok(prim)
    }

    /// Children of `id` in insertion order; empty for unknown ids.
    pub fn children(&self, id: PrimId) -> &[PrimId] {
        self.prims
            .get(id.0)
            .map(|p| p.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: PrimId) -> Option<PrimId> {
        self.prims.get(id.0).and_then(|p| p.parent)
    }

    /// Prims directly under the synthetic root.
    pub fn root_children(&self) -> &[PrimId] {
        &self.root_children
    }

    pub fn prim_count(&self) -> usize {
        self.prims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }

    /// Store a geometry buffer and its interpretation tokens on a mesh prim.
    pub fn set_mesh_attributes(
        &mut self,
        id: PrimId,
        buffer: &GeometryBuffer,
        orientation: Orientation,
        subdivision_scheme: SubdivisionScheme,
    ) -> Result<()> {
        self.expect_kind(id, PrimKind::Mesh)?;
        let prim = self.get_mut(id)?;
        let attributes = &mut prim.attributes;
        attributes.insert(
            attr::POINTS.to_string(),
            AttributeValue::Point3fArray(buffer.points().to_vec()),
        );
        attributes.insert(
            attr::FACE_VERTEX_COUNTS.to_string(),
            AttributeValue::UIntArray(buffer.face_vertex_counts().to_vec()),
        );
        attributes.insert(
            attr::FACE_VERTEX_INDICES.to_string(),
            AttributeValue::UIntArray(buffer.face_vertex_indices().to_vec()),
        );
        attributes.insert(
            attr::ORIENTATION.to_string(),
            AttributeValue::Orientation(orientation),
        );
        attributes.insert(
            attr::SUBDIVISION_SCHEME.to_string(),
            AttributeValue::SubdivisionScheme(subdivision_scheme),
        );
        log::debug!(
            "Set mesh attributes on {}: {} points, {} faces",
            prim.path,
            buffer.vertex_count(),
            buffer.face_count()
        );
        Ok(())
    }

    /// Rebuild the geometry buffer stored on a mesh prim.
    pub fn mesh_geometry(&self, id: PrimId) -> Result<GeometryBuffer> {
        let prim = self.expect_kind(id, PrimKind::Mesh)?;
        let missing = |name: &str| {
            SceneError::InvalidParameter(format!("mesh {} has no {name} array", prim.path))
        };
        let points = prim
            .attribute(attr::POINTS)
            .and_then(AttributeValue::as_points)
            .ok_or_else(|| missing(attr::POINTS))?;
        let counts = prim
            .attribute(attr::FACE_VERTEX_COUNTS)
            .and_then(AttributeValue::as_uints)
            .ok_or_else(|| missing(attr::FACE_VERTEX_COUNTS))?;
        let indices = prim
            .attribute(attr::FACE_VERTEX_INDICES)
            .and_then(AttributeValue::as_uints)
            .ok_or_else(|| missing(attr::FACE_VERTEX_INDICES))?;
        GeometryBuffer::new(points.to_vec(), counts.to_vec(), indices.to_vec())
    }

    /// Set the local transform of any prim.
    pub fn set_transform(&mut self, id: PrimId, transform: NodeTransform) -> Result<()> {
        self.get_mut(id)?.attributes.insert(
            attr::XFORM_OP.to_string(),
            AttributeValue::Transform(transform),
        );
        Ok(())
    }

    /// Set an arbitrary attribute.
    ///
    /// The face-vertex arrays may only be written on mesh prims, and only
    /// with their matching array type. Once all three arrays are present
    /// they must form a valid [`GeometryBuffer`]; a write that would break
    /// one is rejected and leaves the prim unchanged. Use
    /// [`set_mesh_attributes`](Self::set_mesh_attributes) to replace a
    /// mesh's geometry in one step.
    pub fn set_attribute(
        &mut self,
        id: PrimId,
        name: &str,
        value: AttributeValue,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(SceneError::InvalidParameter(
                "attribute name must not be empty".to_string(),
            ));
        }
        let geometry = match name {
            attr::POINTS => Some(matches!(value, AttributeValue::Point3fArray(_))),
            attr::FACE_VERTEX_COUNTS | attr::FACE_VERTEX_INDICES => {
                Some(matches!(value, AttributeValue::UIntArray(_)))
            }
            _ => None,
        };
        if let Some(type_ok) = geometry {
            self.expect_kind(id, PrimKind::Mesh)?;
            if !type_ok {
                return Err(SceneError::InvalidParameter(format!(
                    "attribute {name} cannot hold a {} value",
                    value.type_name()
                )));
            }
        }
        let previous = self.get_mut(id)?.attributes.insert(name.to_string(), value);
        if geometry.is_some() && self.has_complete_geometry(id) {
            if let Err(err) = self.mesh_geometry(id) {
                let attributes = &mut self.get_mut(id)?.attributes;
                match previous {
                    Some(previous) => attributes.insert(name.to_string(), previous),
                    None => attributes.remove(name),
                };
                return Err(err);
            }
        }
        Ok(())
    }

    /// Whether any of the face-vertex arrays is present on `id`.
    pub(crate) fn has_any_geometry(&self, id: PrimId) -> bool {
        attr::GEOMETRY
            .iter()
            .any(|name| self.attribute(id, name).is_some())
    }

    fn has_complete_geometry(&self, id: PrimId) -> bool {
        attr::GEOMETRY
            .iter()
            .all(|name| self.attribute(id, name).is_some())
    }

    pub fn attribute(&self, id: PrimId, name: &str) -> Option<&AttributeValue> {
        self.prims.get(id.0).and_then(|p| p.attribute(name))
    }

    /// Replace the custom layer data.
    pub fn set_custom_layer_data(&mut self, data: BTreeMap<String, Value>) {
        self.custom_layer_data = data;
    }

    pub fn custom_layer_data(&self) -> &BTreeMap<String, Value> {
        &self.custom_layer_data
    }

    /// Set a single top-level custom layer data entry.
    pub fn set_custom_layer_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.custom_layer_data.insert(key.into(), value.into());
    }

    /// Walk all prims depth-first, pre-order, children in insertion order.
    /// The synthetic root is not yielded.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            doc: self,
            stack: self.root_children.iter().rev().copied().collect(),
        }
    }
}

impl PartialEq for SceneDocument {
    fn eq(&self, other: &Self) -> bool {
        self.prim_count() == other.prim_count()
            && self.custom_layer_data == other.custom_layer_data
            && self.traverse().zip(other.traverse()).all(|(a, b)| {
                a.name == b.name
                    && a.path == b.path
                    && a.kind == b.kind
                    && a.attributes == b.attributes
            })
    }
}

/// Pre-order prim iterator returned by [`SceneDocument::traverse`].
pub struct Traverse<'a> {
    doc: &'a SceneDocument,
    stack: Vec<PrimId>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a Prim;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let prim = self.doc.prims.get(id.0)?;
        self.stack.extend(prim.children.iter().rev().copied());
        Some(prim)
    }
}
