//! Greedy voxel-to-box merging.
//!
//! A merge pass turns the filled cells of an [`OccupancyGrid`] into a list of axis-aligned
//! [`VoxelBox`]es that cover every filled cell exactly once and no empty cell.
//!
//! # Policy
//! 1. Reset every merge marker.
//! 2. Scan cells with X as the outer loop, then Y, then Z (inner). The first filled cell that is
//!    not yet merged seeds a new box.
//! 3. Grow along +X while cells are filled and unmerged.
//! 4. Grow along +Y over the whole X range; the shortest column caps the slab.
//! 5. Grow along +Z over the whole X x Y rectangle; the first layer holding any empty or merged
//!    cell caps the box.
//! 6. Mark the box merged, record it, and continue scanning.
//!
//! The same "filled and unmerged" test is applied on all three axes, so boxes never overlap.
//!
//! The result is deterministic but not globally minimal. Downstream code (and the body sync
//! diff) relies on this exact output for a given grid, so the policy must not be "improved".
//!
//! Cost is dominated by the scan over every cell plus the volume of each grown box. Run a pass
//! after occupancy edits, not every frame.

use crate::{grid::OccupancyGrid, utils::LogStopwatch, voxel_box::VoxelBox};

/// Summary of one merge pass, used for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Number of boxes produced.
    pub box_count: usize,
    /// Number of filled cells covered by those boxes.
    pub filled_cells: usize,
}

impl MergeStats {
    pub fn from_boxes(boxes: &[VoxelBox]) -> Self {
        Self {
            box_count: boxes.len(),
            filled_cells: boxes.iter().map(VoxelBox::cell_count).sum(),
        }
    }

    /// Average number of cells folded into each box (1.0 means no merging happened).
    pub fn cells_per_box(&self) -> f32 {
        if self.box_count == 0 {
            return 0.0;
        }
        self.filled_cells as f32 / self.box_count as f32
    }
}

/// Run one full merge pass over `grid`.
///
/// The grid's merge markers are overwritten; its occupancy is left untouched.
pub fn merge_boxes(grid: &mut OccupancyGrid) -> Vec<VoxelBox> {
    let _sw = LogStopwatch::new("merge_boxes");

    grid.clear_merged();

    let mut boxes = Vec::new();
    let mut cursor = (0, 0, 0);

    // Every cell before the last seed (in scan order) is already merged or empty, so each
    // search resumes at the previous seed instead of rescanning from the origin.
    while let Some(seed) = find_seed(grid, cursor) {
        let merged_box = grow_box(grid, seed);
        for (x, y, z) in merged_box.cells() {
            grid.mark_merged(x, y, z);
        }
        boxes.push(merged_box);
        cursor = seed;
    }

    let stats = MergeStats::from_boxes(&boxes);
    log::debug!(
        "merged {} filled cells into {} boxes ({:.1} cells/box)",
        stats.filled_cells,
        stats.box_count,
        stats.cells_per_box()
    );

    boxes
}

/// First filled, unmerged cell at or after `from` in X-outer, Y-middle, Z-inner order.
fn find_seed(grid: &OccupancyGrid, from: (usize, usize, usize)) -> Option<(usize, usize, usize)> {
    let (nx, ny, nz) = grid.dims();
    let (x0, y0, z0) = from;

    for x in x0..nx {
        let y_start = if x == x0 { y0 } else { 0 };
        for y in y_start..ny {
            let z_start = if x == x0 && y == y0 { z0 } else { 0 };
            for z in z_start..nz {
                if grid.is_mergeable(x, y, z) {
                    return Some((x, y, z));
                }
            }
        }
    }

    None
}

/// Grow the largest box the greedy policy allows from `seed`. Does not mark anything.
fn grow_box(grid: &OccupancyGrid, (x0, y0, z0): (usize, usize, usize)) -> VoxelBox {
    let (nx, ny, nz) = grid.dims();

    // X: a single row starting at the seed.
    let mut x1 = x0 + 1;
    while x1 < nx && grid.is_mergeable(x1, y0, z0) {
        x1 += 1;
    }

    // Y: each column may only shorten the slab found so far.
    // Row y0 is known to be mergeable across the whole X range.
    let mut y1 = ny;
    for x in x0..x1 {
        let mut y = y0 + 1;
        while y < y1 && grid.is_mergeable(x, y, z0) {
            y += 1;
        }
        y1 = y;
    }

    // Z: stop at the first layer with any unusable cell in the X x Y rectangle.
    let mut z1 = z0 + 1;
    'layers: while z1 < nz {
        for x in x0..x1 {
            for y in y0..y1 {
                if !grid.is_mergeable(x, y, z1) {
                    break 'layers;
                }
            }
        }
        z1 += 1;
    }

    VoxelBox::new([x0, y0, z0], [x1 - x0, y1 - y0, z1 - z0])
}
