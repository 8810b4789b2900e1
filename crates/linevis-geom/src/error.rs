//! Error types for geometry preprocessing.

use thiserror::Error;

/// Errors raised while validating flat indexed vertex arrays.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// The flat coordinate array does not hold whole xyz triples.
    #[error("vertex array length {0} is not a multiple of 3")]
    MalformedVertexArray(usize),

    /// An index references a vertex that does not exist.
    #[error("index {index} out of range for {vertex_count} vertices")]
    InvalidIndex {
        /// The offending index.
        index: u32,
        /// Number of vertices in the array.
        vertex_count: usize,
    },
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeomError>;
