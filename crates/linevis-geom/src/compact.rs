//! Vertex deduplication for flat indexed meshes.
//!
//! Mesh adapters hand over interleaved `x y z` coordinates plus a triangle
//! index list. Exporters usually duplicate shared vertices per face, so the
//! array is compacted before occluders are built from it.
//!
//! Two strategies are provided:
//!
//! - [`sort_and_compress`] sorts vertices lexicographically and merges equal
//!   neighbours. Output order is the sorted order.
//! - [`clean_indexed_vertex_array`] deduplicates with a hash map and keeps
//!   the first occurrence of every vertex in its original order.
//!
//! Vertices are compared exactly; `-0.0` and `0.0` are treated as equal.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{GeomError, Result};

/// A flat indexed vertex array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedVertices {
    /// Interleaved `x y z` coordinates.
    pub vertices: Vec<f64>,
    /// Indices into `vertices` (by vertex, not by coordinate).
    pub indices: Vec<u32>,
}

impl IndexedVertices {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Coordinates of vertex `i`.
    pub fn vertex(&self, i: usize) -> [f64; 3] {
        [
            self.vertices[3 * i],
            self.vertices[3 * i + 1],
            self.vertices[3 * i + 2],
        ]
    }
}

/// Check that `vertices` holds whole triples and every index is in range.
pub fn validate(vertices: &[f64], indices: &[u32]) -> Result<()> {
    if vertices.len() % 3 != 0 {
        return Err(GeomError::MalformedVertexArray(vertices.len()));
    }
    let vertex_count = vertices.len() / 3;
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(GeomError::InvalidIndex {
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// Sort vertices lexicographically by `(x, y, z)` and remap the indices.
pub fn sort_vertices(vertices: &[f64], indices: &[u32]) -> Result<IndexedVertices> {
    validate(vertices, indices)?;
    let points = triples(vertices);

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| compare_points(&points[a], &points[b]));

    let mut remap = vec![0u32; points.len()];
    let mut sorted = Vec::with_capacity(vertices.len());
    for (new_index, &old_index) in order.iter().enumerate() {
        remap[old_index] = new_index as u32;
        sorted.extend_from_slice(&points[old_index]);
    }

    Ok(IndexedVertices {
        vertices: sorted,
        indices: indices.iter().map(|&i| remap[i as usize]).collect(),
    })
}

/// Merge runs of identical consecutive vertices.
///
/// Only adjacent duplicates are found, so the input should already be
/// sorted (see [`sort_vertices`]).
pub fn compress_indexed_vertex_array(vertices: &[f64], indices: &[u32]) -> Result<IndexedVertices> {
    validate(vertices, indices)?;
    let points = triples(vertices);

    let mut remap = Vec::with_capacity(points.len());
    let mut compressed: Vec<[f64; 3]> = Vec::with_capacity(points.len());
    for p in &points {
        let p = canonical(p);
        if compressed.last() != Some(&p) {
            compressed.push(p);
        }
        remap.push((compressed.len() - 1) as u32);
    }

    Ok(IndexedVertices {
        vertices: compressed.into_iter().flatten().collect(),
        indices: indices.iter().map(|&i| remap[i as usize]).collect(),
    })
}

/// Sort, then merge duplicates.
pub fn sort_and_compress(vertices: &[f64], indices: &[u32]) -> Result<IndexedVertices> {
    let sorted = sort_vertices(vertices, indices)?;
    compress_indexed_vertex_array(&sorted.vertices, &sorted.indices)
}

/// Hash-based deduplication preserving first-occurrence order.
pub fn clean_indexed_vertex_array(vertices: &[f64], indices: &[u32]) -> Result<IndexedVertices> {
    validate(vertices, indices)?;
    let points = triples(vertices);

    let mut seen: HashMap<[u64; 3], u32> = HashMap::with_capacity(points.len());
    let mut remap = Vec::with_capacity(points.len());
    let mut cleaned = Vec::with_capacity(vertices.len());
    for p in &points {
        let p = canonical(p);
        let key = p.map(f64::to_bits);
        let next = seen.len() as u32;
        let index = *seen.entry(key).or_insert_with(|| {
            cleaned.extend_from_slice(&p);
            next
        });
        remap.push(index);
    }

    Ok(IndexedVertices {
        vertices: cleaned,
        indices: indices.iter().map(|&i| remap[i as usize]).collect(),
    })
}

fn triples(vertices: &[f64]) -> Vec<[f64; 3]> {
    vertices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

/// Map `-0.0` to `0.0` so the two compare and hash alike.
fn canonical(p: &[f64; 3]) -> [f64; 3] {
    p.map(|c| c + 0.0)
}

fn compare_points(a: &[f64; 3], b: &[f64; 3]) -> Ordering {
    let a = canonical(a);
    let b = canonical(b);
    a[0].total_cmp(&b[0])
        .then(a[1].total_cmp(&b[1]))
        .then(a[2].total_cmp(&b[2]))
}
