//! Ray traversal through the uniform grid.
//!
//! A [`RayCursor`] holds the per-ray state of a 3D DDA walk: the current
//! cell, the ray's position relative to that cell's minimum corner, and the
//! distance travelled so far. Each cast builds its own cursor, so any number
//! of rays can be cast against a shared grid at once.
//!
//! [`RayWalk`] wraps a cursor as an iterator over the visited cells.

use std::iter::FusedIterator;

use linevis_geom::{intersect_ray_bbox, Aabb3, Ray};
use linevis_math::{Point3, Vec3};

use crate::GridCoord;

/// Grid geometry needed to walk a ray.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lattice {
    pub origin: Point3,
    pub size: Vec3,
    pub cell_size: Vec3,
    pub cell_count: [u32; 3],
}

impl Lattice {
    fn bounds(&self) -> Aabb3 {
        Aabb3::new(self.origin, self.origin + self.size)
    }

    /// Cell containing `p` (clamped into the grid) and `p` relative to that
    /// cell's minimum corner.
    fn locate(&self, p: &Point3) -> (GridCoord, Vec3) {
        let mut cell = GridCoord::default();
        let mut offset = Vec3::zeros();
        for i in 0..3 {
            let local = p[i] - self.origin[i];
            cell[i] = clamp_index(local / self.cell_size[i], self.cell_count[i]);
            offset[i] = (local - cell[i] as f64 * self.cell_size[i]).clamp(0.0, self.cell_size[i]);
        }
        (cell, offset)
    }
}

/// Floor `v` to a cell index in `[0, count)`.
pub(crate) fn clamp_index(v: f64, count: u32) -> u32 {
    let v = v.floor();
    if v.is_nan() || v < 0.0 {
        0
    } else if v >= count as f64 {
        count.saturating_sub(1)
    } else {
        v as u32
    }
}

/// State of one ray walking through the grid.
#[derive(Debug, Clone)]
pub struct RayCursor {
    cell: GridCoord,
    offset: Vec3,
    direction: Vec3,
    t: f64,
    t_end: f64,
}

impl RayCursor {
    /// Place a cursor at the first grid cell along `ray`.
    ///
    /// If the ray origin is outside the grid, the cursor starts where the ray
    /// enters the grid volume. Returns `None` when the ray misses the grid
    /// within `[0, t_end]`.
    pub(crate) fn start(lattice: &Lattice, ray: &Ray, t_end: f64) -> Option<Self> {
        let bounds = lattice.bounds();
        let direction = *ray.direction.as_ref();

        let t = if bounds.contains_point(&ray.origin) {
            0.0
        } else {
            let (t_enter, _) = intersect_ray_bbox(&ray.origin, &direction, &bounds, 0.0, t_end)?;
            t_enter
        };

        let (cell, offset) = lattice.locate(&ray.at(t));
        Some(Self {
            cell,
            offset,
            direction,
            t,
            t_end,
        })
    }

    /// The cell the cursor is in.
    pub fn cell(&self) -> GridCoord {
        self.cell
    }

    /// Distance travelled from the ray origin to the current cell entry.
    pub fn distance(&self) -> f64 {
        self.t
    }

    /// Step to the next cell along the ray.
    ///
    /// The axis whose cell boundary is nearest along the ray is the one that
    /// advances. Returns `false` once the ray leaves the grid or reaches
    /// `t_end`; the cursor must not be used after that.
    pub(crate) fn advance(&mut self, lattice: &Lattice) -> bool {
        let mut nearest: Option<(usize, f64)> = None;
        for i in 0..3 {
            let d = self.direction[i];
            if d == 0.0 {
                continue;
            }
            let t = if d > 0.0 {
                (lattice.cell_size[i] - self.offset[i]) / d
            } else {
                -self.offset[i] / d
            };
            let t = t.max(0.0);
            if nearest.map_or(true, |(_, best)| t < best) {
                nearest = Some((i, t));
            }
        }
        let Some((axis, t_step)) = nearest else {
            return false;
        };

        if self.direction[axis] > 0.0 {
            if self.cell[axis] + 1 >= lattice.cell_count[axis] {
                return false;
            }
            self.offset += t_step * self.direction;
            self.cell[axis] += 1;
            self.offset[axis] = 0.0;
        } else {
            if self.cell[axis] == 0 {
                return false;
            }
            self.offset += t_step * self.direction;
            self.cell[axis] -= 1;
            self.offset[axis] = lattice.cell_size[axis];
        }

        self.t += t_step;
        self.t < self.t_end
    }
}

/// Iterator over the cells a ray passes through, in order.
///
/// Finite: every step moves one axis one cell in the direction of travel, so
/// a walk visits at most `nx + ny + nz - 2` cells.
#[derive(Debug, Clone)]
pub struct RayWalk {
    lattice: Lattice,
    cursor: Option<RayCursor>,
    started: bool,
}

impl RayWalk {
    pub(crate) fn new(lattice: Lattice, cursor: Option<RayCursor>) -> Self {
        Self {
            lattice,
            cursor,
            started: false,
        }
    }

    /// The cursor, if the walk has not finished.
    pub fn cursor(&self) -> Option<&RayCursor> {
        self.cursor.as_ref()
    }
}

impl Iterator for RayWalk {
    type Item = GridCoord;

    fn next(&mut self) -> Option<GridCoord> {
        let cursor = self.cursor.as_mut()?;
        if !self.started {
            self.started = true;
            return Some(cursor.cell);
        }
        if cursor.advance(&self.lattice) {
            Some(cursor.cell)
        } else {
            self.cursor = None;
            None
        }
    }
}

impl FusedIterator for RayWalk {}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice(n: u32) -> Lattice {
        Lattice {
            origin: Point3::origin(),
            size: Vec3::repeat(n as f64),
            cell_size: Vec3::repeat(1.0),
            cell_count: [n; 3],
        }
    }

    fn walk(lattice: Lattice, origin: Point3, dir: Vec3, t_end: f64) -> Vec<GridCoord> {
        let ray = Ray::new(origin, dir);
        RayWalk::new(lattice, RayCursor::start(&lattice, &ray, t_end)).collect()
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-0.5, 4), 0);
        assert_eq!(clamp_index(2.7, 4), 2);
        assert_eq!(clamp_index(4.0, 4), 3);
        assert_eq!(clamp_index(f64::NAN, 4), 0);
        assert_eq!(clamp_index(1e30, 4), 3);
    }

    #[test]
    fn test_axis_aligned_walk() {
        let cells = walk(lattice(4), Point3::new(0.5, 1.5, 2.5), Vec3::x(), f64::INFINITY);
        assert_eq!(
            cells,
            vec![
                GridCoord::new(0, 1, 2),
                GridCoord::new(1, 1, 2),
                GridCoord::new(2, 1, 2),
                GridCoord::new(3, 1, 2),
            ]
        );
    }

    #[test]
    fn test_negative_direction_walk() {
        let cells = walk(lattice(3), Point3::new(2.5, 0.5, 0.5), -Vec3::x(), f64::INFINITY);
        assert_eq!(
            cells,
            vec![
                GridCoord::new(2, 0, 0),
                GridCoord::new(1, 0, 0),
                GridCoord::new(0, 0, 0),
            ]
        );
    }

    #[test]
    fn test_walk_stops_at_t_end() {
        let cells = walk(lattice(4), Point3::new(0.5, 0.5, 0.5), Vec3::x(), 1.2);
        assert_eq!(cells, vec![GridCoord::new(0, 0, 0), GridCoord::new(1, 0, 0)]);

        // Exactly reaching a boundary does not enter the next cell.
        let cells = walk(lattice(4), Point3::new(0.5, 0.5, 0.5), Vec3::x(), 0.5);
        assert_eq!(cells, vec![GridCoord::new(0, 0, 0)]);
    }

    #[test]
    fn test_diagonal_walk_is_connected() {
        let cells = walk(
            lattice(5),
            Point3::new(0.2, 0.7, 0.4),
            Vec3::new(1.0, 0.6, 0.3),
            f64::INFINITY,
        );
        assert_eq!(cells[0], GridCoord::new(0, 0, 0));
        for pair in cells.windows(2) {
            let moved: u32 = (0..3).map(|i| pair[0][i].abs_diff(pair[1][i])).sum();
            assert_eq!(moved, 1, "{:?} -> {:?}", pair[0], pair[1]);
        }
        assert_eq!(cells.last().unwrap()[0], 4);
    }

    #[test]
    fn test_entry_from_outside() {
        let cells = walk(lattice(2), Point3::new(-3.0, 0.5, 1.5), Vec3::x(), f64::INFINITY);
        assert_eq!(cells, vec![GridCoord::new(0, 0, 1), GridCoord::new(1, 0, 1)]);

        // Entering through the far face of a positive-going ray clamps into the grid.
        let cells = walk(lattice(2), Point3::new(5.0, 0.5, 0.5), -Vec3::x(), f64::INFINITY);
        assert_eq!(cells, vec![GridCoord::new(1, 0, 0), GridCoord::new(0, 0, 0)]);
    }

    #[test]
    fn test_miss_yields_nothing() {
        assert!(walk(lattice(2), Point3::new(-3.0, 5.0, 0.5), Vec3::x(), f64::INFINITY).is_empty());
        // Pointing away from the grid.
        assert!(walk(lattice(2), Point3::new(-3.0, 0.5, 0.5), -Vec3::x(), f64::INFINITY).is_empty());
        // Segment ends before reaching the grid.
        assert!(walk(lattice(2), Point3::new(-3.0, 0.5, 0.5), Vec3::x(), 2.0).is_empty());
    }

    #[test]
    fn test_cursor_distance_tracks_entry() {
        let lattice = lattice(4);
        let ray = Ray::new(Point3::new(-1.0, 0.5, 0.5), Vec3::x());
        let mut walk = RayWalk::new(lattice, RayCursor::start(&lattice, &ray, f64::INFINITY));
        assert_eq!(walk.next(), Some(GridCoord::new(0, 0, 0)));
        assert!((walk.cursor().unwrap().distance() - 1.0).abs() < 1e-12);
        walk.next();
        assert!((walk.cursor().unwrap().distance() - 2.0).abs() < 1e-12);
        assert_eq!(walk.by_ref().count(), 2);
        assert!(walk.cursor().is_none());
        assert_eq!(walk.next(), None);
    }
}
