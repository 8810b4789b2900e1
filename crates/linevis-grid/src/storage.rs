//! Cell storage backings.
//!
//! A [`Grid`](crate::Grid) delegates "which cells exist" to a
//! [`CellStorage`]. Cells are created lazily: a slot only holds a [`Cell`]
//! once an occluder has been bucketed into it.

use std::collections::HashMap;

use crate::{Cell, GridCoord};

/// Storage for the lazily created cells of a grid.
pub trait CellStorage: Default {
    /// Drop every cell and prepare empty slots for a `cell_count` grid.
    fn reset(&mut self, cell_count: [u32; 3]);

    /// The cell at `coord`, or `None` if it was never touched.
    fn get(&self, coord: GridCoord) -> Option<&Cell>;

    /// The cell at `coord`, created with `make` if it does not exist yet.
    fn get_or_insert_with(&mut self, coord: GridCoord, make: impl FnOnce() -> Cell) -> &mut Cell;

    /// Release all cells and slots.
    fn clear(&mut self);

    /// Number of cells that exist.
    fn cell_len(&self) -> usize;
}

/// Dense 3D array of cell slots indexed `x + nx * (y + ny * z)`.
///
/// Memory grows with the total cell count, lookups never hash.
#[derive(Debug, Default)]
pub struct DenseCells {
    cell_count: [u32; 3],
    slots: Vec<Option<Cell>>,
    filled: usize,
}

impl DenseCells {
    fn offset(&self, coord: GridCoord) -> usize {
        debug_assert!(
            coord.is_within(self.cell_count),
            "cell {coord:?} outside {:?}",
            self.cell_count
        );
        let [nx, ny, _] = self.cell_count.map(|n| n as usize);
        let [x, y, z] = coord.0.map(|c| c as usize);
        x + nx * (y + ny * z)
    }
}

impl CellStorage for DenseCells {
    fn reset(&mut self, cell_count: [u32; 3]) {
        let total: usize = cell_count.iter().map(|&n| n as usize).product();
        self.cell_count = cell_count;
        self.slots.clear();
        self.slots.resize_with(total, || None);
        self.filled = 0;
    }

    fn get(&self, coord: GridCoord) -> Option<&Cell> {
        self.slots.get(self.offset(coord))?.as_ref()
    }

    fn get_or_insert_with(&mut self, coord: GridCoord, make: impl FnOnce() -> Cell) -> &mut Cell {
        let offset = self.offset(coord);
        let slot = &mut self.slots[offset];
        if slot.is_none() {
            self.filled += 1;
        }
        slot.get_or_insert_with(make)
    }

    fn clear(&mut self) {
        self.cell_count = [0; 3];
        self.slots = Vec::new();
        self.filled = 0;
    }

    fn cell_len(&self) -> usize {
        self.filled
    }
}

/// Hash map of touched cells only.
#[derive(Debug, Default)]
pub struct HashedCells {
    cells: HashMap<GridCoord, Cell>,
}

impl CellStorage for HashedCells {
    fn reset(&mut self, _cell_count: [u32; 3]) {
        self.cells.clear();
    }

    fn get(&self, coord: GridCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    fn get_or_insert_with(&mut self, coord: GridCoord, make: impl FnOnce() -> Cell) -> &mut Cell {
        self.cells.entry(coord).or_insert_with(make)
    }

    fn clear(&mut self) {
        self.cells = HashMap::new();
    }

    fn cell_len(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linevis_math::Point3;

    fn exercise<S: CellStorage>(storage: &mut S) {
        storage.reset([2, 3, 4]);
        let coord = GridCoord::new(1, 2, 3);
        assert!(storage.get(coord).is_none());
        assert_eq!(storage.cell_len(), 0);

        storage.get_or_insert_with(coord, || Cell::new(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(storage.get(coord).unwrap().origin(), &Point3::new(1.0, 2.0, 3.0));
        assert!(storage.get(GridCoord::new(0, 0, 0)).is_none());
        assert_eq!(storage.cell_len(), 1);

        // An existing cell is returned as is.
        let cell = storage.get_or_insert_with(coord, || Cell::new(Point3::origin()));
        assert_eq!(cell.origin(), &Point3::new(1.0, 2.0, 3.0));
        assert_eq!(storage.cell_len(), 1);

        storage.reset([2, 3, 4]);
        assert!(storage.get(coord).is_none());
        assert_eq!(storage.cell_len(), 0);

        storage.clear();
        assert_eq!(storage.cell_len(), 0);
    }

    #[test]
    fn test_dense_storage() {
        exercise(&mut DenseCells::default());
    }

    #[test]
    fn test_hashed_storage() {
        exercise(&mut HashedCells::default());
    }

    #[test]
    fn test_dense_offsets_are_distinct() {
        let mut storage = DenseCells::default();
        storage.reset([3, 4, 5]);
        let mut seen = std::collections::HashSet::new();
        for z in 0..5 {
            for y in 0..4 {
                for x in 0..3 {
                    assert!(seen.insert(storage.offset(GridCoord::new(x, y, z))));
                }
            }
        }
        assert_eq!(seen.len(), 60);
        assert!(seen.iter().all(|&o| o < 60));
    }
}
