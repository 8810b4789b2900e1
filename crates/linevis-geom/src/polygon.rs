//! Occluder polygons with precomputed bounds and normal.

use linevis_math::{Point3, Tolerance, Transform, Vec3};

use crate::{Aabb3, Ray};

/// Result of a ray/polygon intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonHit {
    /// Distance along the (unit) ray direction.
    pub t: f64,
    /// Barycentric weight of the second vertex of the hit triangle.
    pub u: f64,
    /// Barycentric weight of the third vertex of the hit triangle.
    pub v: f64,
}

/// A closed planar polygon used as an occluder.
///
/// Triangles are the common case. Larger polygons are assumed convex; ray
/// intersection fans them around the first vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point3>,
    normal: Vec3,
    bbox: Aabb3,
}

impl Polygon {
    /// Create a polygon from its ordered vertices.
    ///
    /// The normal is computed with Newell's method and is zero for
    /// degenerate input (fewer than three vertices, collinear points).
    pub fn new(vertices: Vec<Point3>) -> Self {
        let bbox = Aabb3::from_points(&vertices);
        let normal = newell_normal(&vertices);
        Self {
            vertices,
            normal,
            bbox,
        }
    }

    /// Create a triangle.
    pub fn triangle(a: Point3, b: Point3, c: Point3) -> Self {
        Self::new(vec![a, b, c])
    }

    /// Ordered vertex positions.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Unit face normal (zero for degenerate polygons).
    pub fn normal(&self) -> &Vec3 {
        &self.normal
    }

    /// Bounding box of the vertices.
    pub fn bbox(&self) -> &Aabb3 {
        &self.bbox
    }

    /// True if the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The three vertices, if this polygon is a triangle.
    pub fn as_triangle(&self) -> Option<[Point3; 3]> {
        match self.vertices.as_slice() {
            [a, b, c] => Some([*a, *b, *c]),
            _ => None,
        }
    }

    /// Copy of this polygon with every vertex moved by `transform`.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self::new(
            self.vertices
                .iter()
                .map(|p| transform.apply_point(p))
                .collect(),
        )
    }

    /// Intersect a ray with this polygon (two-sided).
    ///
    /// Returns the nearest hit at `t >= 0`. For n-gons the barycentric `(u, v)`
    /// refer to the fan triangle `(v0, v[i], v[i + 1])` that was hit.
    pub fn ray_intersect(&self, ray: &Ray, tol: &Tolerance) -> Option<PolygonHit> {
        if self.vertices.len() < 3 {
            return None;
        }
        let dir = ray.direction.as_ref();
        let v0 = self.vertices[0];
        self.vertices[1..]
            .windows(2)
            .filter_map(|w| intersect_ray_triangle(&ray.origin, dir, &v0, &w[0], &w[1], tol))
            .min_by(|a, b| a.t.total_cmp(&b.t))
    }
}

/// Möller–Trumbore ray/triangle intersection (two-sided).
///
/// Returns `None` for rays parallel to the triangle and for hits behind the
/// origin.
pub fn intersect_ray_triangle(
    origin: &Point3,
    direction: &Vec3,
    a: &Point3,
    b: &Point3,
    c: &Point3,
    tol: &Tolerance,
) -> Option<PolygonHit> {
    let edge1 = b - a;
    let edge2 = c - a;
    let pvec = direction.cross(&edge2);
    let det = edge1.dot(&pvec);
    if tol.is_parallel(det) {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = origin - a;
    let u = tvec.dot(&pvec) * inv_det;
    if u < -tol.barycentric || u > 1.0 + tol.barycentric {
        return None;
    }

    let qvec = tvec.cross(&edge1);
    let v = direction.dot(&qvec) * inv_det;
    if v < -tol.barycentric || u + v > 1.0 + tol.barycentric {
        return None;
    }

    let t = edge2.dot(&qvec) * inv_det;
    if t < 0.0 {
        return None;
    }

    Some(PolygonHit { t, u, v })
}

fn newell_normal(vertices: &[Point3]) -> Vec3 {
    let mut n = Vec3::zeros();
    for (i, p) in vertices.iter().enumerate() {
        let q = vertices[(i + 1) % vertices.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n.try_normalize(1e-300).unwrap_or_else(Vec3::zeros)
}
