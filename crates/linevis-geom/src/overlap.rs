//! Triangle/box overlap via the separating axis theorem.
//!
//! Follows Akenine-Möller's formulation: the triangle is moved into the
//! box's frame and tested against 13 candidate axes (9 edge cross products,
//! the 3 box face normals, and the triangle normal). Touching counts as
//! overlap.

use linevis_math::{Point3, Vec3};

/// Test whether a triangle overlaps an axis-aligned box.
///
/// The box is given by its center and half extent along each axis.
pub fn overlap_triangle_box(box_center: &Point3, half_extent: &Vec3, triangle: &[Point3; 3]) -> bool {
    let v = [
        triangle[0] - box_center,
        triangle[1] - box_center,
        triangle[2] - box_center,
    ];
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

    // Cross products of the triangle edges with the box axes.
    for edge in &edges {
        for unit in [Vec3::x(), Vec3::y(), Vec3::z()] {
            let axis = unit.cross(edge);
            if separates(&axis, &v, half_extent) {
                return false;
            }
        }
    }

    // Box face normals: plain interval overlap on each axis.
    for i in 0..3 {
        let lo = v[0][i].min(v[1][i]).min(v[2][i]);
        let hi = v[0][i].max(v[1][i]).max(v[2][i]);
        if lo > half_extent[i] || hi < -half_extent[i] {
            return false;
        }
    }

    // Triangle plane.
    let normal = edges[0].cross(&edges[1]);
    let radius = projected_radius(&normal, half_extent);
    normal.dot(&v[0]).abs() <= radius
}

/// True if projecting the triangle and the box on `axis` gives disjoint intervals.
fn separates(axis: &Vec3, v: &[Vec3; 3], half_extent: &Vec3) -> bool {
    let p0 = axis.dot(&v[0]);
    let p1 = axis.dot(&v[1]);
    let p2 = axis.dot(&v[2]);
    let radius = projected_radius(axis, half_extent);
    p0.min(p1).min(p2) > radius || p0.max(p1).max(p2) < -radius
}

fn projected_radius(axis: &Vec3, half_extent: &Vec3) -> f64 {
    half_extent.x * axis.x.abs() + half_extent.y * axis.y.abs() + half_extent.z * axis.z.abs()
}
