#![warn(missing_docs)]

//! Math types for the linevis occlusion kernel.
//!
//! Thin wrappers around nalgebra: double-precision points, vectors and
//! directions, an affine transform used to move occluders into view space,
//! and the tolerances shared by the geometric predicates.

use nalgebra::{Matrix4, Unit, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Rotation about an arbitrary axis through the origin by `angle` radians.
    ///
    /// Uses Rodrigues' rotation formula.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.as_ref().x, axis.as_ref().y, axis.as_ref().z);
        let mut m = Matrix4::identity();
        m[(0, 0)] = t * x * x + c;
        m[(0, 1)] = t * x * y - s * z;
        m[(0, 2)] = t * x * z + s * y;
        m[(1, 0)] = t * x * y + s * z;
        m[(1, 1)] = t * y * y + c;
        m[(1, 2)] = t * y * z - s * x;
        m[(2, 0)] = t * x * z - s * y;
        m[(2, 1)] = t * y * z + s * x;
        m[(2, 2)] = t * z * z + c;
        Self { matrix: m }
    }

    /// World-to-view transform for a camera at `eye` looking at `target`.
    ///
    /// The camera looks down its local -Z axis with `up` roughly along +Y.
    /// Returns `None` when `eye == target` or `up` is parallel to the view
    /// direction.
    pub fn look_at(eye: &Point3, target: &Point3, up: &Vec3) -> Option<Self> {
        let forward = (target - eye).try_normalize(1e-12)?;
        let right = forward.cross(up).try_normalize(1e-12)?;
        let true_up = right.cross(&forward);

        let mut m = Matrix4::identity();
        for (row, axis) in [right, true_up, -forward].iter().enumerate() {
            m[(row, 0)] = axis.x;
            m[(row, 1)] = axis.y;
            m[(row, 2)] = axis.z;
            m[(row, 3)] = -axis.dot(&eye.coords);
        }
        Some(Self { matrix: m })
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Transform a normal vector (uses inverse transpose of upper-left 3x3).
    pub fn apply_normal(&self, n: &Vec3) -> Vec3 {
        let m3 = self.matrix.fixed_view::<3, 3>(0, 0);
        match m3.try_inverse() {
            Some(inv) => inv.transpose() * n,
            None => *n,
        }
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerances used by the ray and overlap predicates.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Determinant threshold below which a ray counts as parallel to a triangle.
    pub parallel: f64,
    /// `|direction · normal|` threshold below which a hit counts as grazing.
    pub grazing: f64,
    /// Slack on barycentric coordinates so hits on shared edges are not lost.
    pub barycentric: f64,
}

impl Tolerance {
    /// Default occlusion tolerances.
    pub const DEFAULT: Self = Self {
        parallel: 1e-12,
        grazing: 1e-4,
        barycentric: 1e-9,
    };

    /// Check whether a ray/plane determinant is effectively zero.
    pub fn is_parallel(&self, det: f64) -> bool {
        det.abs() < self.parallel
    }

    /// Check whether a ray meets a plane at a grazing angle.
    pub fn is_grazing(&self, direction: &Vec3, normal: &Vec3) -> bool {
        direction.dot(normal).abs() <= self.grazing
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = t.apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_translation_ignores_vectors() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let p = t.apply_point(&Point3::new(1.0, 2.0, 3.0));
        assert!((p.x - 11.0).abs() < 1e-12);
        assert!((p.y - 22.0).abs() < 1e-12);
        assert!((p.z - 33.0).abs() < 1e-12);

        let v = t.apply_vec(&Vec3::new(1.0, 0.0, 0.0));
        assert!((v - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_scale_normal_uses_inverse_transpose() {
        let t = Transform::scale(2.0, 1.0, 1.0);
        let n = t.apply_normal(&Vec3::new(1.0, 1.0, 0.0));
        assert!((n.x - 0.5).abs() < 1e-12);
        assert!((n.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_about_axis() {
        let axis = Dir3::new_normalize(Vec3::z());
        let t = Transform::rotation_about_axis(&axis, PI / 2.0);
        let result = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(result.x.abs() < 1e-12);
        assert!((result.y - 1.0).abs() < 1e-12);
        assert!(result.z.abs() < 1e-12);
    }

    #[test]
    fn test_compose_and_inverse() {
        let t = Transform::translation(1.0, 2.0, 3.0).then(&Transform::scale(2.0, 2.0, 2.0));
        let inv = t.inverse().unwrap();
        let p = Point3::new(5.0, 6.0, 7.0);
        let back = inv.apply_point(&t.apply_point(&p));
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn test_look_at_moves_target_onto_negative_z() {
        let eye = Point3::new(0.0, 0.0, 10.0);
        let target = Point3::origin();
        let view = Transform::look_at(&eye, &target, &Vec3::y()).unwrap();

        let t = view.apply_point(&target);
        assert!(t.x.abs() < 1e-12);
        assert!(t.y.abs() < 1e-12);
        assert!((t.z + 10.0).abs() < 1e-12);

        let e = view.apply_point(&eye);
        assert!(e.coords.norm() < 1e-12);
    }

    #[test]
    fn test_look_at_degenerate() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(Transform::look_at(&p, &p, &Vec3::y()).is_none());
        let straight_up = Point3::new(0.0, 5.0, 0.0);
        assert!(Transform::look_at(&Point3::origin(), &straight_up, &Vec3::y()).is_none());
    }

    #[test]
    fn test_tolerance_grazing() {
        let tol = Tolerance::DEFAULT;
        let n = Vec3::z();
        assert!(tol.is_grazing(&Vec3::x(), &n));
        assert!(!tol.is_grazing(&Vec3::new(1.0, 0.0, 0.01), &n));
        assert!(tol.is_parallel(1e-14));
        assert!(!tol.is_parallel(1e-6));
    }
}
