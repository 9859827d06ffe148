//! Math type aliases and helper functions.
//!
//! Generators work in `f64` and only round to the stored `f32` points at the
//! very end, so sphere points stay on the sphere to within `f32` precision.

pub use nalgebra;

/// 3D vector (f64) used during tessellation.
pub type Vec3 = nalgebra::Vector3<f64>;

/// Round a working vector to a stored point.
pub fn to_point3f(v: &Vec3) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

/// Widen a stored point to a working vector.
pub fn from_point3f(p: [f32; 3]) -> Vec3 {
    Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

/// Area-weighted normal of a polygon loop (Newell's method).
///
/// The result follows the right-hand rule for the given vertex order and is
/// not normalized. Degenerate loops yield the zero vector.
pub fn newell_normal(loop_points: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::zeros();
    for (i, current) in loop_points.iter().enumerate() {
        let next = &loop_points[(i + 1) % loop_points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}
