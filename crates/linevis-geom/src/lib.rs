#![warn(missing_docs)]

//! Geometric predicates and occluder polygons for linevis.
//!
//! These are the closed-form building blocks the occluder grid is written
//! against:
//!
//! - [`Aabb3`] - axis-aligned boxes for occluder bounds and grid cells
//! - [`Ray`] and [`intersect_ray_bbox`] - slab-method ray/box clipping
//! - [`overlap_triangle_box`] - separating-axis triangle/box test
//! - [`Polygon`] - an occluder face with precomputed bounds and normal
//! - [`compact`] - vertex deduplication for flat indexed meshes
//!
//! # Example
//!
//! ```
//! use linevis_geom::{Polygon, Ray};
//! use linevis_math::{Point3, Tolerance, Vec3};
//!
//! let tri = Polygon::triangle(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! );
//! let ray = Ray::new(Point3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
//! let hit = tri.ray_intersect(&ray, &Tolerance::DEFAULT).unwrap();
//! assert!((hit.t - 1.0).abs() < 1e-12);
//! ```

mod bbox;
pub mod compact;
mod error;
mod overlap;
mod polygon;
mod ray;

pub use bbox::Aabb3;
pub use error::{GeomError, Result};
pub use overlap::overlap_triangle_box;
pub use polygon::{intersect_ray_triangle, Polygon, PolygonHit};
pub use ray::{intersect_ray_bbox, Ray};
