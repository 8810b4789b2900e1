#![warn(missing_docs)]

//! Uniform occluder grid for line-drawing visibility.
//!
//! Scene polygons are bucketed into the cells of a regular 3D grid. Rays are
//! then walked cell by cell (3D DDA) and every occluder in a visited cell is
//! handed to an [`OccluderVisitor`], which decides what the cast computes.
//!
//! # Architecture
//!
//! - [`Grid`] - configure, insert, cast; generic over [`CellStorage`]
//! - [`FastGrid`] / [`HashGrid`] - dense and hashed cell backings
//! - [`RayWalk`] - the cells a ray passes through, as an iterator
//! - [`AllOccludersVisitor`] / [`FirstIntersectionVisitor`] - built-in casts
//! - [`build`] - from a flat mesh to a populated grid
//!
//! # Example
//!
//! ```
//! use linevis_geom::Polygon;
//! use linevis_grid::FastGrid;
//! use linevis_math::{Point3, Vec3};
//!
//! let mut grid = FastGrid::new();
//! grid.configure(Point3::origin(), Vec3::new(1.0, 1.0, 1.0), 8).unwrap();
//! let id = grid
//!     .insert_occluder(Polygon::triangle(
//!         Point3::new(0.1, 0.1, 0.5),
//!         Point3::new(0.9, 0.1, 0.5),
//!         Point3::new(0.5, 0.9, 0.5),
//!     ))
//!     .unwrap();
//!
//! let found = grid.cast_ray(&Point3::new(0.5, 0.5, -1.0), &Point3::new(0.5, 0.5, 1.0));
//! assert!(found.contains(&id));
//!
//! let hit = grid
//!     .cast_ray_to_find_first_intersection(&Point3::new(0.5, 0.5, -1.0), &Vec3::z())
//!     .unwrap();
//! assert!((hit.t - 1.5).abs() < 1e-12);
//! ```

pub mod build;
mod cell;
mod error;
mod grid;
mod settings;
mod storage;
mod traversal;
mod visitor;

pub use build::OccluderGrid;
pub use cell::{Cell, GridCoord, OccluderId};
pub use error::{GridError, Result};
pub use grid::{FastGrid, Grid, HashGrid, MAX_CELLS};
pub use settings::{GridSettings, StorageKind};
pub use storage::{CellStorage, DenseCells, HashedCells};
pub use traversal::{RayCursor, RayWalk};
pub use visitor::{
    AllOccludersVisitor, FirstHit, FirstIntersectionVisitor, OccluderSet, OccluderVisitor,
};
