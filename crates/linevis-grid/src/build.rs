//! Building a populated grid from scene geometry.

use log::debug;

use linevis_geom::compact::{self, IndexedVertices};
use linevis_geom::{Aabb3, GeomError, Polygon};
use linevis_math::{Point3, Vec3};

use crate::storage::CellStorage;
use crate::visitor::{FirstHit, OccluderSet, OccluderVisitor};
use crate::{
    FastGrid, Grid, GridError, GridSettings, HashGrid, OccluderId, RayWalk, Result, StorageKind,
};

/// A built grid of either backing.
#[derive(Debug)]
pub enum OccluderGrid {
    /// Dense cell array.
    Fast(FastGrid),
    /// Hashed cells.
    Hashed(HashGrid),
}

impl OccluderGrid {
    /// Which backing this grid uses.
    pub fn storage(&self) -> StorageKind {
        match self {
            Self::Fast(_) => StorageKind::Dense,
            Self::Hashed(_) => StorageKind::Hashed,
        }
    }

    /// See [`Grid::cast_ray`].
    pub fn cast_ray(&self, origin: &Point3, end: &Point3) -> OccluderSet {
        match self {
            Self::Fast(g) => g.cast_ray(origin, end),
            Self::Hashed(g) => g.cast_ray(origin, end),
        }
    }

    /// See [`Grid::cast_infinite_ray`].
    pub fn cast_infinite_ray(&self, origin: &Point3, direction: &Vec3) -> OccluderSet {
        match self {
            Self::Fast(g) => g.cast_infinite_ray(origin, direction),
            Self::Hashed(g) => g.cast_infinite_ray(origin, direction),
        }
    }

    /// See [`Grid::cast_ray_to_find_first_intersection`].
    pub fn cast_ray_to_find_first_intersection(
        &self,
        origin: &Point3,
        direction: &Vec3,
    ) -> Option<FirstHit> {
        match self {
            Self::Fast(g) => g.cast_ray_to_find_first_intersection(origin, direction),
            Self::Hashed(g) => g.cast_ray_to_find_first_intersection(origin, direction),
        }
    }

    /// See [`Grid::cast_ray_with`].
    pub fn cast_ray_with<V: OccluderVisitor>(&self, origin: &Point3, end: &Point3, visitor: &mut V) {
        match self {
            Self::Fast(g) => g.cast_ray_with(origin, end, visitor),
            Self::Hashed(g) => g.cast_ray_with(origin, end, visitor),
        }
    }

    /// See [`Grid::cast_infinite_ray_with`].
    pub fn cast_infinite_ray_with<V: OccluderVisitor>(
        &self,
        origin: &Point3,
        direction: &Vec3,
        visitor: &mut V,
    ) {
        match self {
            Self::Fast(g) => g.cast_infinite_ray_with(origin, direction, visitor),
            Self::Hashed(g) => g.cast_infinite_ray_with(origin, direction, visitor),
        }
    }

    /// See [`Grid::walk_segment`].
    pub fn walk_segment(&self, origin: &Point3, end: &Point3) -> RayWalk {
        match self {
            Self::Fast(g) => g.walk_segment(origin, end),
            Self::Hashed(g) => g.walk_segment(origin, end),
        }
    }

    /// See [`Grid::walk_infinite`].
    pub fn walk_infinite(&self, origin: &Point3, direction: &Vec3) -> RayWalk {
        match self {
            Self::Fast(g) => g.walk_infinite(origin, direction),
            Self::Hashed(g) => g.walk_infinite(origin, direction),
        }
    }

    /// The occluder behind `id`.
    pub fn occluder(&self, id: OccluderId) -> Option<&Polygon> {
        match self {
            Self::Fast(g) => g.occluder(id),
            Self::Hashed(g) => g.occluder(id),
        }
    }

    /// Number of owned occluders.
    pub fn occluder_count(&self) -> usize {
        match self {
            Self::Fast(g) => g.occluder_count(),
            Self::Hashed(g) => g.occluder_count(),
        }
    }

    /// Number of cells along each axis.
    pub fn cell_count(&self) -> [u32; 3] {
        match self {
            Self::Fast(g) => g.cell_count(),
            Self::Hashed(g) => g.cell_count(),
        }
    }

    /// World-space box of the whole grid.
    pub fn bounds(&self) -> Aabb3 {
        match self {
            Self::Fast(g) => g.bounds(),
            Self::Hashed(g) => g.bounds(),
        }
    }
}

/// Smallest thickness of a padded scene axis, relative to its largest extent.
pub const MIN_THICKNESS_RATIO: f64 = 1e-3;

/// Enlarge `bbox` by `padding_ratio` of its extent on every axis, centered.
///
/// Axes thinner than [`MIN_THICKNESS_RATIO`] of the largest padded extent are
/// thickened to that size around their center, so a flat scene with float
/// noise in its depth is sized like an exactly flat one. A box with no
/// extent at all is returned unthickened.
///
/// Returns the `(origin, size)` pair to pass to [`Grid::configure`].
pub fn padded_extent(bbox: &Aabb3, padding_ratio: f64) -> (Point3, Vec3) {
    let extent = bbox.extent();
    let pad = extent * padding_ratio;
    let mut origin = bbox.min - pad * 0.5;
    let mut size = extent + pad;

    let min_thickness = size.max() * MIN_THICKNESS_RATIO;
    for i in 0..3 {
        if size[i] < min_thickness {
            origin[i] -= (min_thickness - size[i]) * 0.5;
            size[i] = min_thickness;
        }
    }
    (origin, size)
}

/// Configure `grid` to cover `bbox` with the padding and cell target in
/// `settings`.
pub fn configure_for_bounds<S: CellStorage>(
    grid: &mut Grid<S>,
    bbox: &Aabb3,
    settings: &GridSettings,
    occluder_count: usize,
) -> Result<()> {
    let (origin, size) = padded_extent(bbox, settings.padding_ratio);
    grid.configure(origin, size, settings.resolve_target_cell_count(occluder_count))
}

fn populate<S: CellStorage>(
    polygons: Vec<Polygon>,
    bbox: &Aabb3,
    settings: &GridSettings,
) -> Result<Grid<S>> {
    let mut grid = Grid::new();
    configure_for_bounds(&mut grid, bbox, settings, polygons.len())?;
    for polygon in polygons {
        grid.insert_occluder(polygon);
    }
    Ok(grid)
}

/// Build a grid over `polygons` and insert all of them.
///
/// # Errors
///
/// [`GridError::EmptyScene`] when no polygon has a vertex, plus anything
/// [`Grid::configure`] or [`GridSettings::validate`] report.
pub fn grid_from_polygons(polygons: Vec<Polygon>, settings: &GridSettings) -> Result<OccluderGrid> {
    settings.validate()?;

    let mut bbox = Aabb3::empty();
    for polygon in polygons.iter().filter(|p| !p.is_empty()) {
        bbox.include_box(polygon.bbox());
    }
    if bbox.is_empty() {
        return Err(GridError::EmptyScene);
    }

    let grid = match settings.storage {
        StorageKind::Dense => OccluderGrid::Fast(populate(polygons, &bbox, settings)?),
        StorageKind::Hashed => OccluderGrid::Hashed(populate(polygons, &bbox, settings)?),
    };
    debug!(
        "built {:?} grid with {} occluders, {:?} cells",
        grid.storage(),
        grid.occluder_count(),
        grid.cell_count()
    );
    Ok(grid)
}

/// Triangles of an indexed mesh, one per index triple.
pub fn triangles(mesh: &IndexedVertices) -> Vec<Polygon> {
    mesh.indices
        .chunks_exact(3)
        .map(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Point3::from(mesh.vertex(i as usize)));
            Polygon::triangle(a, b, c)
        })
        .collect()
}

/// Deduplicate a flat triangle mesh and build a grid from its faces.
///
/// `vertices` holds interleaved `x y z` coordinates, `indices` one triple per
/// triangle. Degenerate triangles are kept.
///
/// # Example
///
/// ```
/// use linevis_grid::{build, GridSettings};
/// use linevis_math::Point3;
///
/// let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
/// let indices = [0, 1, 2, 0, 1, 3, 0, 2, 3, 1, 2, 3];
/// let grid = build::grid_from_mesh(&vertices, &indices, &GridSettings::default()).unwrap();
/// assert_eq!(grid.occluder_count(), 4);
///
/// let found = grid.cast_ray(&Point3::new(0.2, 0.2, -1.0), &Point3::new(0.2, 0.2, 2.0));
/// assert!(!found.is_empty());
/// ```
pub fn grid_from_mesh(vertices: &[f64], indices: &[u32], settings: &GridSettings) -> Result<OccluderGrid> {
    settings.validate()?;
    if indices.len() % 3 != 0 {
        return Err(GridError::InvalidMesh(format!(
            "index count {} is not a multiple of 3",
            indices.len()
        )));
    }
    if let Err(e @ GeomError::InvalidIndex { .. }) = compact::validate(vertices, indices) {
        return Err(GridError::InvalidMesh(e.to_string()));
    }

    let mesh = compact::clean_indexed_vertex_array(vertices, indices)?;
    debug!(
        "compacted mesh: {} -> {} vertices, {} faces",
        vertices.len() / 3,
        mesh.vertex_count(),
        mesh.indices.len() / 3
    );

    grid_from_polygons(triangles(&mesh), settings)
}
