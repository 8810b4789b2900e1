//! Occluder visitors driven by grid traversal.
//!
//! The traversal only decides which cells a ray passes through. What a cast
//! is *for* is up to the visitor: it is shown every occluder of every
//! visited cell and may end the walk early through [`OccluderVisitor::stop`].
//!
//! An occluder spanning several cells is examined once per cell.

use std::collections::BTreeSet;

use linevis_geom::{Aabb3, Polygon, Ray};
use linevis_math::Tolerance;

use crate::{GridCoord, OccluderId};

/// Set of occluders returned by the collecting casts.
pub type OccluderSet = BTreeSet<OccluderId>;

/// Callback interface invoked while a ray walks the grid.
pub trait OccluderVisitor {
    /// Called when the walk enters a non-empty cell, before its occluders.
    fn discover_cell(&mut self, _coord: GridCoord, _cell_box: &Aabb3) {}

    /// Called once for each occluder of the current cell.
    fn examine_occluder(&mut self, id: OccluderId, occluder: &Polygon);

    /// Called after the last occluder of the current cell.
    fn finish_cell(&mut self, _coord: GridCoord, _cell_box: &Aabb3) {}

    /// Checked after each visited cell; `true` ends the walk.
    fn stop(&self) -> bool {
        false
    }
}

/// Collects every occluder found along the ray.
#[derive(Debug, Default)]
pub struct AllOccludersVisitor {
    occluders: OccluderSet,
    examined: usize,
}

impl AllOccludersVisitor {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct occluders seen so far.
    pub fn occluders(&self) -> &OccluderSet {
        &self.occluders
    }

    /// Number of `examine_occluder` calls, duplicates across cells included.
    pub fn examined(&self) -> usize {
        self.examined
    }

    /// Take the collected set.
    pub fn into_occluders(self) -> OccluderSet {
        self.occluders
    }
}

impl OccluderVisitor for AllOccludersVisitor {
    fn examine_occluder(&mut self, id: OccluderId, _occluder: &Polygon) {
        self.examined += 1;
        self.occluders.insert(id);
    }
}

/// Nearest confirmed hit of a first-intersection cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstHit {
    /// The occluder that was hit.
    pub occluder: OccluderId,
    /// Distance from the ray origin along the unit ray direction.
    pub t: f64,
    /// First barycentric coordinate of the hit.
    pub u: f64,
    /// Second barycentric coordinate of the hit.
    pub v: f64,
}

/// Finds the first occluder hit along a ray.
///
/// A hit only counts if it lies inside the cell currently being visited, so
/// a polygon reaching into cells further down the ray is not accepted early.
/// The walk stops at the first cell holding a confirmed hit. This is the
/// nearest hit within that cell, which is not guaranteed to be the globally
/// nearest one when occluders straddle cell boundaries.
#[derive(Debug)]
pub struct FirstIntersectionVisitor {
    ray: Ray,
    tolerance: Tolerance,
    cell_box: Option<Aabb3>,
    best: Option<FirstHit>,
}

impl FirstIntersectionVisitor {
    /// Create a visitor for `ray`.
    pub fn new(ray: Ray, tolerance: Tolerance) -> Self {
        Self {
            ray,
            tolerance,
            cell_box: None,
            best: None,
        }
    }

    /// The best hit so far.
    pub fn hit(&self) -> Option<FirstHit> {
        self.best
    }
}

impl OccluderVisitor for FirstIntersectionVisitor {
    fn discover_cell(&mut self, _coord: GridCoord, cell_box: &Aabb3) {
        self.cell_box = Some(*cell_box);
    }

    fn examine_occluder(&mut self, id: OccluderId, occluder: &Polygon) {
        let Some(hit) = occluder.ray_intersect(&self.ray, &self.tolerance) else {
            return;
        };
        if self
            .tolerance
            .is_grazing(self.ray.direction.as_ref(), occluder.normal())
        {
            return;
        }
        let in_cell = self
            .cell_box
            .is_some_and(|b| b.contains_point(&self.ray.at(hit.t)));
        if in_cell && self.best.map_or(true, |best| hit.t < best.t) {
            self.best = Some(FirstHit {
                occluder: id,
                t: hit.t,
                u: hit.u,
                v: hit.v,
            });
        }
    }

    fn finish_cell(&mut self, _coord: GridCoord, _cell_box: &Aabb3) {
        self.cell_box = None;
    }

    fn stop(&self) -> bool {
        self.best.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linevis_math::{Point3, Vec3};

    fn tri_at_z(z: f64) -> Polygon {
        Polygon::triangle(
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        )
    }

    #[test]
    fn test_all_occluders_counts_duplicates() {
        let mut visitor = AllOccludersVisitor::new();
        let poly = tri_at_z(0.0);
        visitor.examine_occluder(OccluderId(3), &poly);
        visitor.examine_occluder(OccluderId(1), &poly);
        visitor.examine_occluder(OccluderId(3), &poly);
        assert_eq!(visitor.examined(), 3);
        assert!(!visitor.stop());
        let set = visitor.into_occluders();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![OccluderId(1), OccluderId(3)]);
    }

    #[test]
    fn test_first_intersection_keeps_nearest_in_cell() {
        let ray = Ray::new(Point3::new(0.2, 0.2, -1.0), Vec3::z());
        let mut visitor = FirstIntersectionVisitor::new(ray, Tolerance::DEFAULT);
        let cell = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));

        visitor.discover_cell(GridCoord::default(), &cell);
        visitor.examine_occluder(OccluderId(0), &tri_at_z(0.8));
        visitor.examine_occluder(OccluderId(1), &tri_at_z(0.3));
        visitor.examine_occluder(OccluderId(2), &tri_at_z(0.6));
        visitor.finish_cell(GridCoord::default(), &cell);

        let hit = visitor.hit().unwrap();
        assert_eq!(hit.occluder, OccluderId(1));
        assert!((hit.t - 1.3).abs() < 1e-12);
        assert!(visitor.stop());
    }

    #[test]
    fn test_first_intersection_rejects_hit_outside_cell() {
        let ray = Ray::new(Point3::new(0.2, 0.2, -1.0), Vec3::z());
        let mut visitor = FirstIntersectionVisitor::new(ray, Tolerance::DEFAULT);
        let cell = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));

        visitor.discover_cell(GridCoord::default(), &cell);
        visitor.examine_occluder(OccluderId(0), &tri_at_z(1.5));
        visitor.finish_cell(GridCoord::default(), &cell);

        assert!(visitor.hit().is_none());
        assert!(!visitor.stop());
    }

    #[test]
    fn test_first_intersection_rejects_grazing() {
        // Ray runs inside the plane of a vertical triangle.
        let wall = Polygon::triangle(
            Point3::new(0.0, 0.5, 0.0),
            Point3::new(1.0, 0.5, 0.0),
            Point3::new(0.0, 0.5, 1.0),
        );
        let ray = Ray::new(Point3::new(0.1, 0.5, 0.1), Vec3::new(1.0, 0.0, 0.0));
        let mut visitor = FirstIntersectionVisitor::new(ray, Tolerance::DEFAULT);
        let cell = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        visitor.discover_cell(GridCoord::default(), &cell);
        visitor.examine_occluder(OccluderId(0), &wall);
        assert!(visitor.hit().is_none());
    }
}
