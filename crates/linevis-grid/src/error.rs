//! Error types for grid construction.

use linevis_geom::GeomError;
use thiserror::Error;

/// Errors that can occur while configuring or building an occluder grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// More than one axis of the requested extent is zero.
    #[error("grid volume is degenerate: {zero_axes} axes have zero extent")]
    DegenerateVolume {
        /// How many axes were zero (2 or 3).
        zero_axes: usize,
    },

    /// A requested extent or origin is negative or non-finite.
    #[error("invalid grid extent: {0}")]
    InvalidExtent(String),

    /// The target cell count was zero.
    #[error("target cell count must be at least 1")]
    InvalidCellCount,

    /// The volume's aspect ratio would need more cells than the grid allows.
    #[error("grid would need {0} cells")]
    TooManyCells(f64),

    /// Invalid grid settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Mesh input could not be turned into occluders.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// The scene contains no occluders to bound the grid.
    #[error("scene has no occluders")]
    EmptyScene,

    /// Vertex array preprocessing failed.
    #[error(transparent)]
    Geometry(#[from] GeomError),
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
