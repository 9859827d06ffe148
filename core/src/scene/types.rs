//! Scene document data types.
//!
//! Transforms use plain arrays (`[f32; 3]`, `[f32; 4]`) so the serialized
//! form stays independent of any math library.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mesh::{Orientation, SubdivisionScheme};

/// Node transform decomposed into translation, rotation, and scale.
///
/// Convert to `nalgebra` types as needed:
/// `Vector3::from(t.translation)`, `Quaternion::from(t.rotation)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    /// Translation [x, y, z].
    pub translation: [f32; 3],
    /// Rotation quaternion [x, y, z, w].
    pub rotation: [f32; 4],
    /// Scale [x, y, z].
    pub scale: [f32; 3],
}

impl NodeTransform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Returns this transform with a different translation.
    #[must_use]
    pub const fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }

    /// Returns this transform with a different rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this transform with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Kind tag of a prim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimKind {
    /// Transform-only grouping node.
    Xform,
    /// Geometry-bearing node.
    Mesh,
}

impl PrimKind {
    /// Schema name used in text exports.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Xform => "Xform",
            Self::Mesh => "Mesh",
        }
    }
}

impl fmt::Display for PrimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Handle to a prim inside one [`SceneDocument`](super::SceneDocument).
///
/// Ids are arena indices. They stay valid for the lifetime of the document
/// that issued them and mean nothing to any other document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimId(pub(crate) usize);

impl PrimId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Well-known attribute names.
pub mod attr {
    pub const POINTS: &str = "points";
    pub const FACE_VERTEX_COUNTS: &str = "faceVertexCounts";
    pub const FACE_VERTEX_INDICES: &str = "faceVertexIndices";
    pub const ORIENTATION: &str = "orientation";
    pub const SUBDIVISION_SCHEME: &str = "subdivisionScheme";
    pub const XFORM_OP: &str = "xformOp";

    /// The face-vertex arrays that together describe mesh geometry.
    pub const GEOMETRY: [&str; 3] = [POINTS, FACE_VERTEX_COUNTS, FACE_VERTEX_INDICES];
}

/// Typed value of a prim attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Point3fArray(Vec<[f32; 3]>),
    UIntArray(Vec<u32>),
    Double(f64),
    Token(String),
    Orientation(Orientation),
    SubdivisionScheme(SubdivisionScheme),
    Transform(NodeTransform),
}

impl AttributeValue {
    /// Short type name, matching the USD spelling where one exists.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point3fArray(_) => "point3f[]",
            Self::UIntArray(_) => "int[]",
            Self::Double(_) => "double",
            Self::Token(_) => "token",
            Self::Orientation(_) => "token",
            Self::SubdivisionScheme(_) => "token",
            Self::Transform(_) => "xformOp",
        }
    }

    pub fn as_points(&self) -> Option<&[[f32; 3]]> {
        match self {
            Self::Point3fArray(points) => Some(points),
            _ => None,
        }
    }

    pub fn as_uints(&self) -> Option<&[u32]> {
        match self {
            Self::UIntArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_orientation(&self) -> Option<Orientation> {
        match self {
            Self::Orientation(o) => Some(*o),
            _ => None,
        }
    }

    pub fn as_subdivision_scheme(&self) -> Option<SubdivisionScheme> {
        match self {
            Self::SubdivisionScheme(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_transform(&self) -> Option<&NodeTransform> {
        match self {
            Self::Transform(t) => Some(t),
            _ => None,
        }
    }
}

/// A named node in the scene hierarchy.
///
/// Prims are owned by their document's arena and reached through
/// [`PrimId`]s. `children` keeps insertion order.
#[derive(Debug, Clone)]
pub struct Prim {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) kind: PrimKind,
    pub(crate) parent: Option<PrimId>,
    pub(crate) children: Vec<PrimId>,
    pub(crate) attributes: BTreeMap<String, AttributeValue>,
}

impl Prim {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path, e.g. `/World/Cone`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> PrimKind {
        self.kind
    }

    /// Parent prim, or `None` for prims directly under the root.
    pub fn parent(&self) -> Option<PrimId> {
        self.parent
    }

    pub fn children(&self) -> &[PrimId] {
        &self.children
    }

    /// Number of path segments minus one.
    pub fn depth(&self) -> usize {
        self.path.matches('/').count().saturating_sub(1)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.attribute(attr::ORIENTATION)
            .and_then(AttributeValue::as_orientation)
    }

    pub fn subdivision_scheme(&self) -> Option<SubdivisionScheme> {
        self.attribute(attr::SUBDIVISION_SCHEME)
            .and_then(AttributeValue::as_subdivision_scheme)
    }

    pub fn transform(&self) -> Option<&NodeTransform> {
        self.attribute(attr::XFORM_OP)
            .and_then(AttributeValue::as_transform)
    }
}
