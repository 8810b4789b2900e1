//! The uniform occluder grid.
//!
//! Lifecycle: construct empty, [`configure`](Grid::configure) once per
//! visibility pass, [`insert_occluder`](Grid::insert_occluder) every polygon,
//! then cast as many rays as needed. Casting only reads the grid, so one
//! grid can serve many threads at once.

use log::{debug, trace, warn};

use linevis_geom::{overlap_triangle_box, Aabb3, Polygon, Ray};
use linevis_math::{Point3, Tolerance, Vec3};

use crate::storage::{CellStorage, DenseCells, HashedCells};
use crate::traversal::{clamp_index, Lattice, RayCursor, RayWalk};
use crate::visitor::{
    AllOccludersVisitor, FirstHit, FirstIntersectionVisitor, OccluderSet, OccluderVisitor,
};
use crate::{Cell, GridCoord, GridError, OccluderId, Result};

/// Upper bound on the number of cells a configuration may produce.
pub const MAX_CELLS: f64 = (1u64 << 26) as f64;

/// Grid backed by a dense cell array.
pub type FastGrid = Grid<DenseCells>;

/// Grid backed by a hash map of touched cells.
pub type HashGrid = Grid<HashedCells>;

/// A uniform grid of cells, each listing the occluders that overlap it.
#[derive(Debug)]
pub struct Grid<S> {
    origin: Point3,
    size: Vec3,
    cell_size: Vec3,
    cell_count: [u32; 3],
    occluders: Vec<Polygon>,
    cells: S,
    tolerance: Tolerance,
}

impl<S: CellStorage> Default for Grid<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CellStorage> Grid<S> {
    /// Create an unconfigured, empty grid.
    pub fn new() -> Self {
        Self {
            origin: Point3::origin(),
            size: Vec3::zeros(),
            cell_size: Vec3::zeros(),
            cell_count: [0; 3],
            occluders: Vec::new(),
            cells: S::default(),
            tolerance: Tolerance::DEFAULT,
        }
    }

    /// Set the tolerances used by first-intersection casts.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Size the grid to cover `size` from `origin` with roughly
    /// `target_cell_count` cells.
    ///
    /// Cells are as close to cubes as the volume allows: the cube root of
    /// `volume / target_cell_count` gives an edge length `e`, and each axis
    /// gets `floor(size / e) + 1` cells.
    ///
    /// A volume with exactly one zero axis (a flat scene) is widened on that
    /// axis to the smallest other extent, centered on the input, and given a
    /// single layer of cells; the edge length then comes from the area of the
    /// other two axes.
    ///
    /// Any previously inserted occluders and cells are dropped.
    ///
    /// # Errors
    ///
    /// [`GridError::DegenerateVolume`] when two or more axes are zero,
    /// [`GridError::InvalidExtent`] for negative or non-finite input,
    /// [`GridError::InvalidCellCount`] when `target_cell_count` is zero,
    /// [`GridError::TooManyCells`] when the aspect ratio would need more than
    /// [`MAX_CELLS`] cells.
    pub fn configure(&mut self, origin: Point3, size: Vec3, target_cell_count: u32) -> Result<()> {
        if !origin.iter().all(|c| c.is_finite()) {
            return Err(GridError::InvalidExtent(format!("origin {origin:?} is not finite")));
        }
        if !size.iter().all(|c| c.is_finite() && *c >= 0.0) {
            return Err(GridError::InvalidExtent(format!(
                "size {size:?} must be finite and non-negative"
            )));
        }
        if target_cell_count == 0 {
            return Err(GridError::InvalidCellCount);
        }

        let zero_axes: Vec<usize> = (0..3).filter(|&i| size[i] == 0.0).collect();
        let mut origin = origin;
        let mut size = size;
        let target = f64::from(target_cell_count);

        let counts: [f64; 3] = match zero_axes.as_slice() {
            [] => {
                let edge = (size.x * size.y * size.z / target).cbrt();
                [0, 1, 2].map(|i| (size[i] / edge).floor() + 1.0)
            }
            &[flat] => {
                let widened = (0..3)
                    .filter(|&i| i != flat)
                    .map(|i| size[i])
                    .fold(f64::INFINITY, f64::min);
                warn!("grid has zero extent on axis {flat}, widening to {widened}");
                size[flat] = widened;
                origin[flat] -= widened / 2.0;

                let area: f64 = (0..3).filter(|&i| i != flat).map(|i| size[i]).product();
                let edge = (area / target).sqrt();
                [0, 1, 2].map(|i| if i == flat { 1.0 } else { (size[i] / edge).floor() + 1.0 })
            }
            _ => {
                return Err(GridError::DegenerateVolume {
                    zero_axes: zero_axes.len(),
                })
            }
        };

        let total: f64 = counts.iter().product();
        if !total.is_finite() || total > MAX_CELLS {
            return Err(GridError::TooManyCells(total));
        }

        self.origin = origin;
        self.size = size;
        self.cell_count = counts.map(|n| n as u32);
        self.cell_size = Vec3::from_fn(|i, _| size[i] / f64::from(self.cell_count[i]));
        self.occluders.clear();
        self.cells.reset(self.cell_count);

        debug!(
            "configured grid: origin {:?}, size {:?}, {:?} cells of {:?}",
            self.origin, self.size, self.cell_count, self.cell_size
        );
        Ok(())
    }

    /// Take ownership of `polygon` and bucket it into every cell it overlaps.
    ///
    /// Triangles are tested exactly against each candidate cell. Other
    /// polygons go into every cell their bounding box touches.
    ///
    /// Returns the new occluder's handle, or `None` for a polygon without
    /// vertices, which is ignored.
    pub fn insert_occluder(&mut self, polygon: Polygon) -> Option<OccluderId> {
        debug_assert!(self.is_configured(), "insert_occluder before configure");
        if !self.is_configured() {
            warn!("dropping occluder inserted into an unconfigured grid");
            return None;
        }
        if polygon.is_empty() {
            trace!("ignoring occluder without vertices");
            return None;
        }

        let id = OccluderId(self.occluders.len() as u32);
        let bbox = *polygon.bbox();
        let triangle = polygon.as_triangle();
        self.occluders.push(polygon);

        let lo = self.cell_coordinates(&bbox.min);
        let hi = self.cell_coordinates(&bbox.max);
        trace!("occluder {} spans cells {:?}..={:?}", id.index(), lo.0, hi.0);

        for z in lo[2]..=hi[2] {
            for y in lo[1]..=hi[1] {
                for x in lo[0]..=hi[0] {
                    let coord = GridCoord::new(x, y, z);
                    if let Some(tri) = &triangle {
                        let cell_box = self.cell_box(coord);
                        if !overlap_triangle_box(&cell_box.center(), &cell_box.half_extent(), tri) {
                            continue;
                        }
                    }
                    self.cell_entry(coord).add_occluder(id);
                }
            }
        }
        Some(id)
    }

    /// Tolerances used by first-intersection casts.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    fn cell_entry(&mut self, coord: GridCoord) -> &mut Cell {
        let origin = self.cell_origin(coord);
        self.cells.get_or_insert_with(coord, || Cell::new(origin))
    }

    /// Every occluder along the segment from `origin` to `end`.
    ///
    /// The result is a set of candidates: occluders in cells the segment
    /// crosses, not necessarily occluders the segment actually hits.
    pub fn cast_ray(&self, origin: &Point3, end: &Point3) -> OccluderSet {
        let mut visitor = AllOccludersVisitor::new();
        self.cast_ray_with(origin, end, &mut visitor);
        visitor.into_occluders()
    }

    /// Every occluder along the ray from `origin` in `direction`, up to the
    /// point where it leaves the grid.
    pub fn cast_infinite_ray(&self, origin: &Point3, direction: &Vec3) -> OccluderSet {
        let mut visitor = AllOccludersVisitor::new();
        self.cast_infinite_ray_with(origin, direction, &mut visitor);
        visitor.into_occluders()
    }

    /// The first occluder hit by the ray from `origin` in `direction`.
    ///
    /// Walks the grid until a cell yields a hit inside that cell and returns
    /// the nearest such hit. `t` is measured along the normalized direction.
    pub fn cast_ray_to_find_first_intersection(
        &self,
        origin: &Point3,
        direction: &Vec3,
    ) -> Option<FirstHit> {
        let ray = Ray::try_new(*origin, *direction)?;
        let mut visitor = FirstIntersectionVisitor::new(ray, self.tolerance);
        self.drive(self.walk(&ray, f64::INFINITY), &mut visitor);
        visitor.hit()
    }

    /// Walk the segment from `origin` to `end`, driving a custom visitor.
    pub fn cast_ray_with<V: OccluderVisitor>(&self, origin: &Point3, end: &Point3, visitor: &mut V) {
        self.drive(self.walk_segment(origin, end), visitor);
    }

    /// Walk the infinite ray from `origin`, driving a custom visitor.
    pub fn cast_infinite_ray_with<V: OccluderVisitor>(
        &self,
        origin: &Point3,
        direction: &Vec3,
        visitor: &mut V,
    ) {
        self.drive(self.walk_infinite(origin, direction), visitor);
    }

    /// Cells crossed by the segment from `origin` to `end`, in order.
    pub fn walk_segment(&self, origin: &Point3, end: &Point3) -> RayWalk {
        match Ray::segment(*origin, *end) {
            Some((ray, length)) => self.walk(&ray, length),
            None => RayWalk::new(self.lattice(), None),
        }
    }

    /// Cells crossed by the ray from `origin` in `direction`, in order.
    pub fn walk_infinite(&self, origin: &Point3, direction: &Vec3) -> RayWalk {
        match Ray::try_new(*origin, *direction) {
            Some(ray) => self.walk(&ray, f64::INFINITY),
            None => RayWalk::new(self.lattice(), None),
        }
    }

    fn walk(&self, ray: &Ray, t_end: f64) -> RayWalk {
        let lattice = self.lattice();
        let cursor = if self.is_configured() {
            RayCursor::start(&lattice, ray, t_end)
        } else {
            None
        };
        RayWalk::new(lattice, cursor)
    }

    fn drive<V: OccluderVisitor>(&self, walk: RayWalk, visitor: &mut V) {
        for coord in walk {
            if let Some(cell) = self.cells.get(coord) {
                let cell_box = self.cell_box(coord);
                visitor.discover_cell(coord, &cell_box);
                for &id in cell.occluders() {
                    visitor.examine_occluder(id, &self.occluders[id.index()]);
                }
                visitor.finish_cell(coord, &cell_box);
            }
            if visitor.stop() {
                break;
            }
        }
    }

    /// Drop all occluders and cells and return to the unconfigured state.
    pub fn clear(&mut self) {
        self.occluders = Vec::new();
        self.cells.clear();
        self.origin = Point3::origin();
        self.size = Vec3::zeros();
        self.cell_size = Vec3::zeros();
        self.cell_count = [0; 3];
    }

    fn lattice(&self) -> Lattice {
        Lattice {
            origin: self.origin,
            size: self.size,
            cell_size: self.cell_size,
            cell_count: self.cell_count,
        }
    }

    /// True once [`configure`](Self::configure) has succeeded (and the grid
    /// has not been cleared since).
    pub fn is_configured(&self) -> bool {
        self.cell_count.iter().all(|&n| n > 0)
    }

    /// Minimum corner of the grid volume.
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Extent of the grid volume along each axis.
    pub fn size(&self) -> &Vec3 {
        &self.size
    }

    /// Extent of one cell along each axis.
    pub fn cell_size(&self) -> &Vec3 {
        &self.cell_size
    }

    /// Number of cells along each axis.
    pub fn cell_count(&self) -> [u32; 3] {
        self.cell_count
    }

    /// World-space box of the whole grid.
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::new(self.origin, self.origin + self.size)
    }

    /// The occluder behind `id`.
    pub fn occluder(&self, id: OccluderId) -> Option<&Polygon> {
        self.occluders.get(id.index())
    }

    /// All owned occluders, indexed by [`OccluderId::index`].
    pub fn occluders(&self) -> &[Polygon] {
        &self.occluders
    }

    /// Number of owned occluders.
    pub fn occluder_count(&self) -> usize {
        self.occluders.len()
    }

    /// The cell at `coord`, if any occluder overlaps it.
    pub fn cell(&self, coord: GridCoord) -> Option<&Cell> {
        if coord.is_within(self.cell_count) {
            self.cells.get(coord)
        } else {
            None
        }
    }

    /// Number of cells holding at least one occluder.
    pub fn populated_cell_count(&self) -> usize {
        self.cells.cell_len()
    }

    /// Cell containing `p`, clamped into the grid.
    pub fn cell_coordinates(&self, p: &Point3) -> GridCoord {
        let mut coord = GridCoord::default();
        for i in 0..3 {
            coord[i] = clamp_index((p[i] - self.origin[i]) / self.cell_size[i], self.cell_count[i]);
        }
        coord
    }

    /// Minimum corner of the cell at `coord`.
    pub fn cell_origin(&self, coord: GridCoord) -> Point3 {
        let steps = Vec3::new(f64::from(coord[0]), f64::from(coord[1]), f64::from(coord[2]));
        self.origin + self.cell_size.component_mul(&steps)
    }

    /// World-space box of the cell at `coord`.
    pub fn cell_box(&self, coord: GridCoord) -> Aabb3 {
        let min = self.cell_origin(coord);
        Aabb3::new(min, min + self.cell_size)
    }
}
