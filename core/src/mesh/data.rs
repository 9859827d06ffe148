//! Face-vertex geometry data.
//!
//! This module provides:
//! - [`GeometryBuffer`] - Points plus run-length-counted face loops
//! - [`Orientation`] - Winding convention used to read face loops as normals
//! - [`SubdivisionScheme`] - Surface subdivision applied by consumers

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::math::{from_point3f, newell_normal, Vec3};

/// Winding convention for face loops.
///
/// With [`RightHanded`](Self::RightHanded) a loop read in stored order is
/// counter-clockwise when viewed from outside; with
/// [`LeftHanded`](Self::LeftHanded) it is clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    RightHanded,
    LeftHanded,
}

impl Orientation {
    /// Token spelling used in text encodings.
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::RightHanded => "rightHanded",
            Self::LeftHanded => "leftHanded",
        }
    }

    /// Parse a token spelling.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "rightHanded" => Some(Self::RightHanded),
            "leftHanded" => Some(Self::LeftHanded),
            _ => None,
        }
    }
}

/// Subdivision scheme a consumer should apply to the control mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubdivisionScheme {
    #[default]
    CatmullClark,
    /// Render the mesh as authored.
    None,
}

impl SubdivisionScheme {
    /// Token spelling used in text encodings.
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::CatmullClark => "catmullClark",
            Self::None => "none",
        }
    }

    /// Parse a token spelling.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "catmullClark" => Some(Self::CatmullClark),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Tessellated output of a primitive generator.
///
/// `face_vertex_counts[i]` consecutive entries of `face_vertex_indices`
/// form the loop of face `i`. Point order is load-bearing: indices refer to
/// positions in `points`.
///
/// A buffer is immutable once built. [`GeometryBuffer::new`] checks that the
/// counts add up to the index count, that every index is in range, that
/// every coordinate is finite, and that there is at least one face.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBuffer {
    points: Vec<[f32; 3]>,
    face_vertex_counts: Vec<u32>,
    face_vertex_indices: Vec<u32>,
}

impl GeometryBuffer {
    /// Build a buffer, validating its invariants.
    pub fn new(
        points: Vec<[f32; 3]>,
        face_vertex_counts: Vec<u32>,
        face_vertex_indices: Vec<u32>,
    ) -> Result<Self> {
        let buffer = Self {
            points,
            face_vertex_counts,
            face_vertex_indices,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Wrap generator output. Invariants are only checked in debug builds.
    pub(crate) fn from_generated(
        points: Vec<[f32; 3]>,
        face_vertex_counts: Vec<u32>,
        face_vertex_indices: Vec<u32>,
    ) -> Self {
        let buffer = Self {
            points,
            face_vertex_counts,
            face_vertex_indices,
        };
        debug_assert!(buffer.validate().is_ok());
        buffer
    }

    /// Check the face-vertex invariants.
    pub fn validate(&self) -> Result<()> {
        if self.face_vertex_counts.is_empty() {
            return Err(SceneError::InvalidParameter(
                "geometry must contain at least one face".into(),
            ));
        }
        if let Some(face) = self.face_vertex_counts.iter().position(|&c| c == 0) {
            return Err(SceneError::InvalidParameter(format!(
                "face {face} has a vertex count of zero"
            )));
        }
        let total: u64 = self.face_vertex_counts.iter().map(|&c| c as u64).sum();
        if total != self.face_vertex_indices.len() as u64 {
            return Err(SceneError::InvalidParameter(format!(
                "face vertex counts sum to {total} but {} indices are present",
                self.face_vertex_indices.len()
            )));
        }
        if let Some(point) = self
            .points
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(SceneError::InvalidParameter(format!(
                "point {point} has a non-finite coordinate"
            )));
        }
        let point_count = self.points.len();
        if let Some(&index) = self
            .face_vertex_indices
            .iter()
            .find(|&&i| i as usize >= point_count)
        {
            return Err(SceneError::InvalidParameter(format!(
                "face vertex index {index} out of range for {point_count} points"
            )));
        }
        Ok(())
    }

    /// Point positions, indexed by vertex id.
    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    /// Number of vertices in each face, in face order.
    pub fn face_vertex_counts(&self) -> &[u32] {
        &self.face_vertex_counts
    }

    /// Flattened face loops.
    pub fn face_vertex_indices(&self) -> &[u32] {
        &self.face_vertex_indices
    }

    /// Number of points.
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.face_vertex_counts.len()
    }

    /// Iterate the vertex loop of each face.
    pub fn faces(&self) -> Faces<'_> {
        Faces {
            counts: self.face_vertex_counts.iter(),
            indices: &self.face_vertex_indices,
        }
    }

    /// Outward normal of a face under the given orientation (not normalized).
    ///
    /// Returns `None` if `face` is out of range. Degenerate faces yield the
    /// zero vector.
    pub fn face_normal(&self, face: usize, orientation: Orientation) -> Option<Vec3> {
        let loop_indices = self.faces().nth(face)?;
        let loop_points: Vec<Vec3> = loop_indices
            .iter()
            .map(|&i| from_point3f(self.points[i as usize]))
            .collect();
        let normal = newell_normal(&loop_points);
        Some(match orientation {
            Orientation::RightHanded => normal,
            Orientation::LeftHanded => -normal,
        })
    }

    /// Whether every undirected edge is shared by exactly two faces and
    /// every directed edge appears once, i.e. the surface is closed and
    /// consistently wound.
    pub fn is_closed_manifold(&self) -> bool {
        let mut directed: HashMap<(u32, u32), u32> = HashMap::new();
        for face in self.faces() {
            for (i, &a) in face.iter().enumerate() {
                let b = face[(i + 1) % face.len()];
                *directed.entry((a, b)).or_default() += 1;
            }
        }
        directed
            .iter()
            .all(|(&(a, b), &uses)| uses == 1 && directed.get(&(b, a)) == Some(&1))
    }

    /// Consume the buffer, returning `(points, counts, indices)`.
    pub fn into_parts(self) -> (Vec<[f32; 3]>, Vec<u32>, Vec<u32>) {
        (self.points, self.face_vertex_counts, self.face_vertex_indices)
    }
}

/// Iterator over face loops of a [`GeometryBuffer`].
pub struct Faces<'a> {
    counts: std::slice::Iter<'a, u32>,
    indices: &'a [u32],
}

impl<'a> Iterator for Faces<'a> {
    type Item = &'a [u32];

    fn next(&mut self) -> Option<Self::Item> {
        let count = *self.counts.next()? as usize;
        let face = self.indices.get(..count)?;
        self.indices = &self.indices[count..];
        Some(face)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.counts.size_hint()
    }
}
