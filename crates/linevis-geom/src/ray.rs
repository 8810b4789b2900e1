//! Ray representation and the slab-method ray/box test.

use linevis_math::{Dir3, Point3, Vec3};

use crate::Aabb3;

/// A ray in 3D space defined by origin and unit direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized. Use [`Ray::try_new`] when the
    /// direction may be zero.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: Dir3::new_normalize(direction),
        }
    }

    /// Create a ray, or `None` if `direction` has zero (or non-finite) length.
    pub fn try_new(origin: Point3, direction: Vec3) -> Option<Self> {
        if !direction.iter().all(|c| c.is_finite()) {
            return None;
        }
        Dir3::try_new(direction, 0.0).map(|direction| Self { origin, direction })
    }

    /// Ray from `origin` towards `end`, plus the distance between them.
    ///
    /// Returns `None` when the two points coincide.
    pub fn segment(origin: Point3, end: Point3) -> Option<(Self, f64)> {
        let delta = end - origin;
        let length = delta.norm();
        Self::try_new(origin, delta).map(|ray| (ray, length))
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Clip the ray against an AABB for `t >= 0`.
    ///
    /// Returns `Some((t_enter, t_exit))` if the ray intersects the box.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        intersect_ray_bbox(&self.origin, self.direction.as_ref(), aabb, 0.0, f64::INFINITY)
    }
}

/// Clip the parametric range `[t_min, t_max]` of a ray against a box.
///
/// Returns the sub-range `(t_enter, t_exit)` during which the ray is inside
/// `aabb`, or `None` if the ray misses the box within the given range.
/// Axis-parallel rays are handled without dividing by zero: a zero direction
/// component only passes if the origin lies inside that slab.
pub fn intersect_ray_bbox(
    origin: &Point3,
    direction: &Vec3,
    aabb: &Aabb3,
    t_min: f64,
    t_max: f64,
) -> Option<(f64, f64)> {
    let mut t_enter = t_min;
    let mut t_exit = t_max;

    for i in 0..3 {
        let d = direction[i];
        if d == 0.0 {
            if origin[i] < aabb.min[i] || origin[i] > aabb.max[i] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (aabb.min[i] - origin[i]) * inv;
        let mut t1 = (aabb.max[i] - origin[i]) * inv;
        if inv < 0.0 {
            std::mem::swap(&mut t0, &mut t1);
        }

        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_exit < t_enter {
            return None;
        }
    }

    Some((t_enter, t_exit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb3 {
        Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let p = ray.at(5.0);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_try_new_rejects_zero_direction() {
        assert!(Ray::try_new(Point3::origin(), Vec3::zeros()).is_none());
        assert!(Ray::try_new(Point3::origin(), Vec3::new(f64::NAN, 0.0, 1.0)).is_none());
        assert!(Ray::segment(Point3::origin(), Point3::origin()).is_none());
    }

    #[test]
    fn test_segment_length() {
        let (ray, len) = Ray::segment(Point3::origin(), Point3::new(3.0, 4.0, 0.0)).unwrap();
        assert!((len - 5.0).abs() < 1e-12);
        assert!((ray.direction.x - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_ray_aabb_hit() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit_box()).unwrap();
        assert!((t_min - 5.0).abs() < 1e-10);
        assert!((t_max - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_aabb_miss() {
        let ray = Ray::new(Point3::new(-5.0, 5.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn test_ray_inside_aabb() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit_box()).unwrap();
        assert_eq!(t_min, 0.0);
        assert!((t_max - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_ray_aabb_behind() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn test_ray_aabb_on_face_plane() {
        // Origin lies exactly on the x = 0 face; the slab check is inclusive.
        let ray = Ray::new(Point3::new(0.0, 0.5, -2.0), Vec3::new(0.0, 0.0, 1.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit_box()).unwrap();
        assert!((t_min - 2.0).abs() < 1e-12);
        assert!((t_max - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_bbox_range_limits() {
        let origin = Point3::new(-5.0, 0.5, 0.5);
        let dir = Vec3::new(1.0, 0.0, 0.0);
        // Segment ends before the box.
        assert!(intersect_ray_bbox(&origin, &dir, &unit_box(), 0.0, 4.0).is_none());
        // Segment ends inside the box.
        let (enter, exit) = intersect_ray_bbox(&origin, &dir, &unit_box(), 0.0, 5.5).unwrap();
        assert!((enter - 5.0).abs() < 1e-12);
        assert!((exit - 5.5).abs() < 1e-12);
    }
}
