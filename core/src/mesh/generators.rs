//! Mesh generators for parametric primitives.
//!
//! All generators are pure and deterministic. They compute in `f64` and
//! store `f32` points, and they wind every face to the
//! [`GENERATED_ORIENTATION`] convention: the right-hand-rule normal of each
//! stored loop points into the solid, so the left-handed normal points out.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::error::{Result, SceneError};
use crate::math::{to_point3f, Vec3};

use super::data::{GeometryBuffer, Orientation};

/// Winding convention of every generated buffer.
///
/// Pass this to `SceneDocument::set_mesh_attributes` so consumers compute
/// outward normals.
pub const GENERATED_ORIENTATION: Orientation = Orientation::LeftHanded;

/// Smallest ring resolution accepted by the cone and UV sphere.
pub const MIN_RESOLUTION: u32 = 3;

/// Largest ring resolution accepted by the cone and UV sphere. Keeps every
/// UV sphere index within `u32`.
pub const MAX_RESOLUTION: u32 = 4096;

/// Largest icosphere subdivision level (`20 * 4^6` = 81920 faces).
pub const MAX_ICOSPHERE_SUBDIVISION: u32 = 6;

/// Canonical icosahedron corners before normalization, built from the
/// golden ratio.
fn icosahedron_corners() -> [Vec3; 12] {
    let phi = (1.0 + 5f64.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, phi, 0.0),
        Vec3::new(1.0, phi, 0.0),
        Vec3::new(-1.0, -phi, 0.0),
        Vec3::new(1.0, -phi, 0.0),
        Vec3::new(0.0, -1.0, phi),
        Vec3::new(0.0, 1.0, phi),
        Vec3::new(0.0, -1.0, -phi),
        Vec3::new(0.0, 1.0, -phi),
        Vec3::new(phi, 0.0, -1.0),
        Vec3::new(phi, 0.0, 1.0),
        Vec3::new(-phi, 0.0, -1.0),
        Vec3::new(-phi, 0.0, 1.0),
    ]
}

/// The 20 icosahedron faces, wound for [`GENERATED_ORIENTATION`].
const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    // around vertex 0
    [0, 5, 11],
    [0, 1, 5],
    [0, 7, 1],
    [0, 10, 7],
    [0, 11, 10],
    // adjacent band
    [1, 9, 5],
    [5, 4, 11],
    [11, 2, 10],
    [10, 6, 7],
    [7, 8, 1],
    // around vertex 3
    [3, 4, 9],
    [3, 2, 4],
    [3, 6, 2],
    [3, 8, 6],
    [3, 9, 8],
    // lower band
    [4, 5, 9],
    [2, 11, 4],
    [6, 10, 2],
    [8, 7, 6],
    [9, 1, 8],
];

fn check_resolution(resolution: u32) -> Result<()> {
    if resolution < MIN_RESOLUTION {
        return Err(SceneError::InvalidParameter(format!(
            "resolution must be at least {MIN_RESOLUTION}, got {resolution}"
        )));
    }
    if resolution > MAX_RESOLUTION {
        return Err(SceneError::InvalidParameter(format!(
            "resolution must be at most {MAX_RESOLUTION}, got {resolution}"
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(SceneError::InvalidParameter(format!(
            "{name} must be a positive finite number, got {value}"
        )));
    }
    Ok(())
}

/// Generate a cone standing on the XZ plane with its apex on +Y.
///
/// Points `0..resolution` form the base ring, point `resolution` is the apex
/// at `(0, height, 0)`. Side faces are triangles
/// `(i, (i + 1) % resolution, resolution)`. With `base_cap` one extra
/// `resolution`-gon lists the ring in reverse order so it faces down.
///
/// # Arguments
///
/// * `resolution` - Number of base ring points (at least 3)
/// * `height` - Apex height above the base
/// * `radius` - Base ring radius
/// * `base_cap` - Whether to close the bottom
pub fn generate_cone(
    resolution: u32,
    height: f32,
    radius: f32,
    base_cap: bool,
) -> Result<GeometryBuffer> {
    check_resolution(resolution)?;
    check_positive("height", height)?;
    check_positive("radius", radius)?;

    let r = radius as f64;
    let n = resolution as usize;
    let mut points = Vec::with_capacity(n + 1);
    for i in 0..resolution {
        let angle = 2.0 * PI * i as f64 / resolution as f64;
        points.push(to_point3f(&Vec3::new(r * angle.cos(), 0.0, r * angle.sin())));
    }
    points.push([0.0, height, 0.0]);

    let face_total = n + usize::from(base_cap);
    let mut counts = Vec::with_capacity(face_total);
    let mut indices = Vec::with_capacity(3 * n + if base_cap { n } else { 0 });

    for i in 0..resolution {
        indices.extend_from_slice(&[i, (i + 1) % resolution, resolution]);
        counts.push(3);
    }

    if base_cap {
        indices.extend((0..resolution).rev());
        counts.push(resolution);
    }

    log::trace!(
        "Generated cone: resolution={resolution}, height={height}, radius={radius}, cap={base_cap}"
    );
    Ok(GeometryBuffer::from_generated(points, counts, indices))
}

/// Generate a latitude/longitude sphere centered at the origin.
///
/// Creates `(resolution + 1) * resolution` points laid out row-major by
/// ring `v` (pole to pole) and segment `u`, and `resolution²` quads
/// `(v,u), (v+1,u), (v+1,u+1), (v,u+1)` with `u` wrapping at the seam.
///
/// The first and last rings collapse onto the poles. Their points are kept
/// as distinct vertices and the pole quads stay degenerate.
///
/// # Arguments
///
/// * `resolution` - Number of rings and segments (at least 3)
/// * `radius` - Sphere radius
pub fn generate_uv_sphere(resolution: u32, radius: f32) -> Result<GeometryBuffer> {
    check_resolution(resolution)?;
    check_positive("radius", radius)?;

    let r = radius as f64;
    let n = resolution as usize;
    let mut points = Vec::with_capacity((n + 1) * n);

    for v in 0..=resolution {
        let theta = PI * v as f64 / resolution as f64;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for u in 0..resolution {
            let phi = 2.0 * PI * u as f64 / resolution as f64;
            let (sin_phi, cos_phi) = phi.sin_cos();
            points.push(to_point3f(&Vec3::new(
                r * sin_theta * cos_phi,
                r * cos_theta,
                r * sin_theta * sin_phi,
            )));
        }
    }

    let index = |v: u32, u: u32| v * resolution + u % resolution;
    let mut indices = Vec::with_capacity(4 * n * n);
    for v in 0..resolution {
        for u in 0..resolution {
            indices.extend_from_slice(&[
                index(v, u),
                index(v + 1, u),
                index(v + 1, u + 1),
                index(v, u + 1),
            ]);
        }
    }

    log::trace!("Generated UV sphere: resolution={resolution}, radius={radius}");
    Ok(GeometryBuffer::from_generated(
        points,
        vec![4; n * n],
        indices,
    ))
}

/// Generate a sphere approximation from a subdivided icosahedron.
///
/// Level 0 is the regular icosahedron (12 points, 20 triangles). Each
/// further level splits every triangle into four through its edge midpoints,
/// which are shared between neighbouring faces and pushed out to the sphere.
///
/// # Arguments
///
/// * `radius` - Sphere radius
/// * `subdivision` - Number of midpoint subdivision rounds (0 to 6)
pub fn generate_icosphere_approx(radius: f32, subdivision: u32) -> Result<GeometryBuffer> {
    check_positive("radius", radius)?;
    if subdivision > MAX_ICOSPHERE_SUBDIVISION {
        return Err(SceneError::InvalidParameter(format!(
            "subdivision must be at most {MAX_ICOSPHERE_SUBDIVISION}, got {subdivision}"
        )));
    }

    let mut vertices: Vec<Vec3> = icosahedron_corners()
        .iter()
        .map(|corner| corner.normalize())
        .collect();
    let mut faces: Vec<[u32; 3]> = ICOSAHEDRON_FACES.to_vec();

    for _ in 0..subdivision {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<Vec3>| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let mid = (vertices[a as usize] + vertices[b as usize]).normalize();
                vertices.push(mid);
                (vertices.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for &[a, b, c] in &faces {
            let ab = midpoint(a, b, &mut vertices);
            let bc = midpoint(b, c, &mut vertices);
            let ca = midpoint(c, a, &mut vertices);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    let r = radius as f64;
    let points = vertices.iter().map(|v| to_point3f(&(v * r))).collect();
    let counts = vec![3; faces.len()];
    let indices = faces.into_iter().flatten().collect();

    log::trace!("Generated icosphere: radius={radius}, subdivision={subdivision}");
    Ok(GeometryBuffer::from_generated(points, counts, indices))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::math::from_point3f;

    fn assert_on_sphere(buffer: &GeometryBuffer, radius: f32) {
        for (i, p) in buffer.points().iter().enumerate() {
            let norm = from_point3f(*p).norm();
            let rel = (norm - radius as f64).abs() / radius as f64;
            assert!(rel < 1e-6, "point {i} {p:?} has norm {norm}, expected {radius}");
        }
    }

    /// Every non-degenerate face normal points away from the origin.
    fn assert_outward(buffer: &GeometryBuffer, centre: Vec3) {
        for (face, loop_indices) in buffer.faces().enumerate() {
            let normal = buffer.face_normal(face, GENERATED_ORIENTATION).unwrap();
            if normal.norm() < 1e-9 {
                continue;
            }
            let centroid = loop_indices
                .iter()
                .map(|&i| from_point3f(buffer.points()[i as usize]))
                .sum::<Vec3>()
                / loop_indices.len() as f64;
            assert!(
                normal.dot(&(centroid - centre)) > 0.0,
                "face {face} {loop_indices:?} points inward"
            );
        }
    }

    #[test]
    fn cone_matches_reference_scenario() {
        let cone = generate_cone(4, 2.0, 1.0, false).unwrap();
        let expected = [
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [-1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0],
            [0.0, 2.0, 0.0],
        ];
        assert_eq!(cone.vertex_count(), 5);
        for (got, want) in cone.points().iter().zip(expected.iter()) {
            for axis in 0..3 {
                assert!((got[axis] - want[axis]).abs() < 1e-6, "{got:?} != {want:?}");
            }
        }
        assert_eq!(cone.face_vertex_counts(), &[3, 3, 3, 3]);
        assert_eq!(
            cone.face_vertex_indices(),
            &[0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4]
        );
    }

    #[rstest]
    #[case(3)]
    #[case(4)]
    #[case(12)]
    #[case(64)]
    fn cone_topology(#[case] resolution: u32) {
        let cone = generate_cone(resolution, 2.0, 1.0, false).unwrap();
        assert_eq!(cone.vertex_count(), resolution as usize + 1);
        assert_eq!(cone.face_count(), resolution as usize);
        assert!(cone.face_vertex_counts().iter().all(|&c| c == 3));
        assert!(cone
            .face_vertex_indices()
            .iter()
            .all(|&i| i <= resolution));
    }

    #[rstest]
    #[case(3)]
    #[case(16)]
    fn capped_cone_is_closed_and_outward(#[case] resolution: u32) {
        let cone = generate_cone(resolution, 1.5, 0.75, true).unwrap();
        assert_eq!(cone.face_count(), resolution as usize + 1);
        assert_eq!(*cone.face_vertex_counts().last().unwrap(), resolution);
        let cap: Vec<u32> = cone.faces().last().unwrap().to_vec();
        let expected: Vec<u32> = (0..resolution).rev().collect();
        assert_eq!(cap, expected);
        assert!(cone.is_closed_manifold());
        assert_outward(&cone, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn cap_faces_down() {
        let cone = generate_cone(8, 2.0, 1.0, true).unwrap();
        let normal = cone.face_normal(8, GENERATED_ORIENTATION).unwrap();
        assert!(normal.y < 0.0);
        assert!(normal.x.abs() < 1e-9 && normal.z.abs() < 1e-9);
    }

    #[test]
    fn cone_rejects_bad_parameters() {
        assert!(matches!(
            generate_cone(2, 1.0, 1.0, false),
            Err(SceneError::InvalidParameter(_))
        ));
        assert!(generate_cone(8, 0.0, 1.0, false).is_err());
        assert!(generate_cone(8, 1.0, -1.0, false).is_err());
        assert!(generate_cone(8, f32::NAN, 1.0, false).is_err());
    }

    #[rstest]
    #[case(3, 1.0)]
    #[case(8, 2.5)]
    #[case(32, 0.01)]
    fn uv_sphere_counts(#[case] resolution: u32, #[case] radius: f32) {
        let sphere = generate_uv_sphere(resolution, radius).unwrap();
        let n = resolution as usize;
        assert_eq!(sphere.vertex_count(), (n + 1) * n);
        assert_eq!(sphere.face_count(), n * n);
        assert!(sphere.face_vertex_counts().iter().all(|&c| c == 4));
        assert_on_sphere(&sphere, radius);
    }

    #[test]
    fn uv_sphere_keeps_duplicate_pole_vertices() {
        let sphere = generate_uv_sphere(6, 2.0).unwrap();
        let north = &sphere.points()[..6];
        let south = &sphere.points()[sphere.vertex_count() - 6..];
        for p in north {
            assert!((p[1] - 2.0).abs() < 1e-6 && p[0].abs() < 1e-6 && p[2].abs() < 1e-6);
        }
        for p in south {
            assert!((p[1] + 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn uv_sphere_wraps_seam() {
        let sphere = generate_uv_sphere(4, 1.0).unwrap();
        // Last quad of the first ring wraps from u = 3 back to u = 0.
        let quad = sphere.faces().nth(3).unwrap();
        assert_eq!(quad, &[3, 7, 4, 0]);
    }

    #[test]
    fn uv_sphere_faces_point_outward() {
        assert_outward(&generate_uv_sphere(12, 1.0).unwrap(), Vec3::zeros());
    }

    #[test]
    fn uv_sphere_rejects_bad_parameters() {
        assert!(generate_uv_sphere(2, 1.0).is_err());
        assert!(generate_uv_sphere(8, 0.0).is_err());
        assert!(matches!(
            generate_uv_sphere(MAX_RESOLUTION + 1, 1.0),
            Err(SceneError::InvalidParameter(_))
        ));
        assert!(generate_uv_sphere(u32::MAX, 1.0).is_err());
        assert!(generate_cone(u32::MAX, 1.0, 1.0, true).is_err());
    }

    #[test]
    fn icosahedron_base() {
        let ico = generate_icosphere_approx(1.0, 0).unwrap();
        assert_eq!(ico.vertex_count(), 12);
        assert_eq!(ico.face_count(), 20);
        assert!(ico.face_vertex_indices().iter().all(|&i| i < 12));
        assert!(ico.is_closed_manifold());
        assert_on_sphere(&ico, 1.0);
        assert_outward(&ico, Vec3::zeros());
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn icosphere_subdivision(#[case] level: u32) {
        let radius = 3.0;
        let ico = generate_icosphere_approx(radius, level).unwrap();
        let factor = 4usize.pow(level);
        assert_eq!(ico.vertex_count(), 10 * factor + 2);
        assert_eq!(ico.face_count(), 20 * factor);
        assert!(ico.is_closed_manifold());
        assert_on_sphere(&ico, radius);
        assert_outward(&ico, Vec3::zeros());
    }

    #[test]
    fn icosphere_rejects_bad_parameters() {
        assert!(generate_icosphere_approx(0.0, 0).is_err());
        assert!(generate_icosphere_approx(1.0, MAX_ICOSPHERE_SUBDIVISION + 1).is_err());
    }

    #[test]
    fn generators_are_deterministic() {
        assert_eq!(
            generate_uv_sphere(9, 1.25).unwrap(),
            generate_uv_sphere(9, 1.25).unwrap()
        );
        assert_eq!(
            generate_icosphere_approx(1.0, 2).unwrap(),
            generate_icosphere_approx(1.0, 2).unwrap()
        );
    }
}
