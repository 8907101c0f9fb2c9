/// Tuning knobs for the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    cell_shift: u8,
    max_cells_per_region: usize,
}

impl IndexConfig {
    /// Largest accepted shift; a cell then spans 2^24 blocks.
    pub const MAX_CELL_SHIFT: u8 = 24;

    /// Clamps the shift into the supported range.
    #[must_use]
    pub fn new(cell_shift: u8, max_cells_per_region: usize) -> Self {
        Self {
            cell_shift: cell_shift.min(Self::MAX_CELL_SHIFT),
            max_cells_per_region: max_cells_per_region.max(1),
        }
    }

    /// Cells are `1 << cell_shift` blocks wide on x and z.
    #[must_use]
    pub const fn cell_shift(&self) -> u8 {
        self.cell_shift
    }

    /// Regions covering more cells than this go on the oversized list.
    #[must_use]
    pub const fn max_cells_per_region(&self) -> usize {
        self.max_cells_per_region
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cell_shift: 4,
            max_cells_per_region: 4096,
        }
    }
}
