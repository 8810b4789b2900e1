//! Grid coordinates, occluder handles, and cells.

use std::ops::{Index, IndexMut};

use linevis_math::Point3;

/// Integer coordinates of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridCoord(pub [u32; 3]);

impl GridCoord {
    /// Create a coordinate from its components.
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self([x, y, z])
    }

    /// True if every component is below the matching `cell_count` entry.
    pub fn is_within(&self, cell_count: [u32; 3]) -> bool {
        (0..3).all(|i| self.0[i] < cell_count[i])
    }
}

impl Index<usize> for GridCoord {
    type Output = u32;

    fn index(&self, axis: usize) -> &u32 {
        &self.0[axis]
    }
}

impl IndexMut<usize> for GridCoord {
    fn index_mut(&mut self, axis: usize) -> &mut u32 {
        &mut self.0[axis]
    }
}

/// Handle to an occluder owned by a grid.
///
/// Handles index the grid's occluder arena and stay valid until the grid is
/// cleared or reconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccluderId(pub(crate) u32);

impl OccluderId {
    /// Position of the occluder in the grid's arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One grid bucket: the occluders overlapping it.
#[derive(Debug, Clone)]
pub struct Cell {
    origin: Point3,
    occluders: Vec<OccluderId>,
}

impl Cell {
    /// Create an empty cell whose minimum corner is `origin`.
    pub fn new(origin: Point3) -> Self {
        Self {
            origin,
            occluders: Vec::new(),
        }
    }

    /// Minimum corner in world space.
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Occluders overlapping this cell, in insertion order.
    pub fn occluders(&self) -> &[OccluderId] {
        &self.occluders
    }

    pub(crate) fn add_occluder(&mut self, id: OccluderId) {
        self.occluders.push(id);
    }
}
