//! Dense 3D occupancy grid.
//!
//! # Model
//! - The grid is `nx x ny x nz` cells, each `sx x sy x sz` meters.
//! - Cell `(0, 0, 0)` has its minimum corner at the world origin; the grid extends along +X/+Y/+Z.
//! - Two flat buffers of equal length are kept side by side:
//!   - `filled`: the occupancy authored by generation/editing code.
//!   - `merged`: scratch markers owned by the box merger during a merge pass.
//!
//! # Indexing
//! Cells are linearized in X-major order:
//! - `index = xi + nx * yi + nx * ny * zi`
//!
//! Accessors take signed coordinates so callers can probe past the low edge. Anything outside
//! `[0, dim)` is rejected, never wrapped: reads return `false` and writes are ignored.

use nalgebra::Vector3;

use crate::error::GridError;

/// Signed cell coordinate used at the accessor boundary.
pub type CellCoord = i32;

#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    nx: usize,
    ny: usize,
    nz: usize,
    cell_size: Vector3<f32>,
    filled: Vec<bool>,
    merged: Vec<bool>,
}

impl OccupancyGrid {
    /// Create an empty grid (every cell unfilled).
    ///
    /// Fails if any dimension is zero or any cell size is not a positive finite number.
    pub fn new(
        (nx, ny, nz): (usize, usize, usize),
        (sx, sy, sz): (f32, f32, f32),
    ) -> Result<Self, GridError> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(GridError::ZeroDimension { nx, ny, nz });
        }
        let valid = |s: f32| s.is_finite() && s > 0.0;
        if !(valid(sx) && valid(sy) && valid(sz)) {
            return Err(GridError::InvalidCellSize { sx, sy, sz });
        }
        // Signed accessors must be able to address every cell.
        let max_dim = CellCoord::MAX as usize;
        let len = nx
            .checked_mul(ny)
            .and_then(|n| n.checked_mul(nz))
            .filter(|_| nx <= max_dim && ny <= max_dim && nz <= max_dim)
            .ok_or(GridError::TooManyCells { nx, ny, nz })?;

        Ok(Self {
            nx,
            ny,
            nz,
            cell_size: Vector3::new(sx, sy, sz),
            filled: vec![false; len],
            merged: vec![false; len],
        })
    }

    /// Grid dimensions in cells `(nx, ny, nz)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// World-space size of one cell (meters).
    #[inline]
    pub fn cell_size(&self) -> Vector3<f32> {
        self.cell_size
    }

    /// Total world-space extent of the grid (meters).
    #[inline]
    pub fn world_size(&self) -> Vector3<f32> {
        Vector3::new(
            self.nx as f32 * self.cell_size.x,
            self.ny as f32 * self.cell_size.y,
            self.nz as f32 * self.cell_size.z,
        )
    }

    /// Number of cells in the grid.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.filled.len()
    }

    /// Linear index of a cell, or `None` if any coordinate is outside `[0, dim)`.
    #[inline]
    pub fn index(&self, xi: CellCoord, yi: CellCoord, zi: CellCoord) -> Option<usize> {
        let x = usize::try_from(xi).ok().filter(|&x| x < self.nx)?;
        let y = usize::try_from(yi).ok().filter(|&y| y < self.ny)?;
        let z = usize::try_from(zi).ok().filter(|&z| z < self.nz)?;
        Some(self.linear(x, y, z))
    }

    /// Linear index for coordinates already known to be in bounds.
    #[inline]
    pub(crate) fn linear(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.nx && y < self.ny && z < self.nz);
        x + self.nx * y + self.nx * self.ny * z
    }

    /// Set the occupancy of one cell. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set_filled(&mut self, xi: CellCoord, yi: CellCoord, zi: CellCoord, value: bool) {
        if let Some(i) = self.index(xi, yi, zi) {
            self.filled[i] = value;
        }
    }

    /// Occupancy of one cell; `false` outside the grid.
    #[inline]
    pub fn is_filled(&self, xi: CellCoord, yi: CellCoord, zi: CellCoord) -> bool {
        self.index(xi, yi, zi).is_some_and(|i| self.filled[i])
    }

    /// Merge marker of one cell; `false` outside the grid.
    ///
    /// Only meaningful during or right after a merge pass.
    #[inline]
    pub fn is_merged(&self, xi: CellCoord, yi: CellCoord, zi: CellCoord) -> bool {
        self.index(xi, yi, zi).is_some_and(|i| self.merged[i])
    }

    /// Set the merge marker of one cell. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set_merged(&mut self, xi: CellCoord, yi: CellCoord, zi: CellCoord, value: bool) {
        if let Some(i) = self.index(xi, yi, zi) {
            self.merged[i] = value;
        }
    }

    /// Filled and not yet merged, for in-bounds coordinates.
    #[inline]
    pub(crate) fn is_mergeable(&self, x: usize, y: usize, z: usize) -> bool {
        let i = self.linear(x, y, z);
        self.filled[i] && !self.merged[i]
    }

    #[inline]
    pub(crate) fn mark_merged(&mut self, x: usize, y: usize, z: usize) {
        let i = self.linear(x, y, z);
        self.merged[i] = true;
    }

    /// Reset every merge marker to `false`.
    pub fn clear_merged(&mut self) {
        self.merged.fill(false);
    }

    /// Set every cell to `value`.
    pub fn fill_all(&mut self, value: bool) {
        self.filled.fill(value);
    }

    /// Set every cell in the half-open range `[min, max)` to `value`.
    ///
    /// The range is clipped to the grid, so it may start or end outside of it.
    pub fn set_filled_region(
        &mut self,
        min: (CellCoord, CellCoord, CellCoord),
        max: (CellCoord, CellCoord, CellCoord),
        value: bool,
    ) {
        let clip = |lo: CellCoord, hi: CellCoord, dim: usize| {
            let lo = lo.max(0) as usize;
            let hi = (hi.max(0) as usize).min(dim);
            lo..hi.max(lo)
        };
        let xs = clip(min.0, max.0, self.nx);
        let ys = clip(min.1, max.1, self.ny);
        let zs = clip(min.2, max.2, self.nz);

        for z in zs {
            for y in ys.clone() {
                for x in xs.clone() {
                    let i = self.linear(x, y, z);
                    self.filled[i] = value;
                }
            }
        }
    }

    /// Number of filled cells.
    pub fn filled_count(&self) -> usize {
        self.filled.iter().filter(|&&f| f).count()
    }

    /// Iterate the coordinates of every filled cell in linear index order.
    pub fn iter_filled(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let (nx, ny) = (self.nx, self.ny);
        self.filled
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(move |(i, _)| (i % nx, (i / nx) % ny, i / (nx * ny)))
    }

    /// World-space center of a cell. Does not check bounds.
    #[inline]
    pub fn cell_center(&self, xi: CellCoord, yi: CellCoord, zi: CellCoord) -> Vector3<f32> {
        Vector3::new(
            (xi as f32 + 0.5) * self.cell_size.x,
            (yi as f32 + 0.5) * self.cell_size.y,
            (zi as f32 + 0.5) * self.cell_size.z,
        )
    }

    /// Cell containing a world-space point, or `None` if the point lies outside the grid.
    pub fn world_to_cell(&self, point: Vector3<f32>) -> Option<(CellCoord, CellCoord, CellCoord)> {
        let gx = (point.x / self.cell_size.x).floor();
        let gy = (point.y / self.cell_size.y).floor();
        let gz = (point.z / self.cell_size.z).floor();
        if !(gx.is_finite() && gy.is_finite() && gz.is_finite()) {
            return None;
        }
        let cell = (gx as CellCoord, gy as CellCoord, gz as CellCoord);
        self.index(cell.0, cell.1, cell.2).map(|_| cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(nx: usize, ny: usize, nz: usize) -> OccupancyGrid {
        OccupancyGrid::new((nx, ny, nz), (1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn new_grid_starts_empty() {
        let g = grid(3, 4, 5);
        assert_eq!(g.cell_count(), 60);
        assert_eq!(g.filled_count(), 0);
        assert!(!g.is_filled(0, 0, 0));
    }

    #[test]
    fn rejects_zero_dimension() {
        let err = OccupancyGrid::new((4, 0, 4), (1.0, 1.0, 1.0)).unwrap_err();
        assert_eq!(err, GridError::ZeroDimension { nx: 4, ny: 0, nz: 4 });
    }

    #[test]
    fn rejects_bad_cell_size() {
        for size in [(0.0, 1.0, 1.0), (1.0, -0.5, 1.0), (1.0, 1.0, f32::NAN)] {
            let err = OccupancyGrid::new((2, 2, 2), size).unwrap_err();
            assert!(matches!(err, GridError::InvalidCellSize { .. }));
        }
    }

    #[test]
    fn rejects_overflowing_cell_count() {
        let err = OccupancyGrid::new((usize::MAX, 2, 2), (1.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, GridError::TooManyCells { .. }));
    }

    #[test]
    fn linear_index_is_x_major() {
        let g = grid(3, 4, 5);
        assert_eq!(g.index(0, 0, 0), Some(0));
        assert_eq!(g.index(1, 0, 0), Some(1));
        assert_eq!(g.index(0, 1, 0), Some(3));
        assert_eq!(g.index(0, 0, 1), Some(12));
        assert_eq!(g.index(2, 3, 4), Some(59));
    }

    #[test]
    fn out_of_bounds_is_rejected_not_wrapped() {
        let mut g = grid(2, 2, 2);
        assert_eq!(g.index(-1, 0, 0), None);
        assert_eq!(g.index(2, 0, 0), None);
        assert_eq!(g.index(0, 0, 2), None);

        // Writes past the edge are silently ignored.
        g.set_filled(2, 0, 0, true);
        g.set_filled(-1, 1, 1, true);
        assert_eq!(g.filled_count(), 0);

        // Reads past the edge are unfilled.
        g.fill_all(true);
        assert!(!g.is_filled(0, -1, 0));
        assert!(!g.is_filled(0, 0, 2));
        assert!(!g.is_merged(5, 5, 5));
    }

    #[test]
    fn filled_and_merged_are_independent() {
        let mut g = grid(2, 2, 2);
        g.set_filled(1, 1, 1, true);
        assert!(g.is_filled(1, 1, 1));
        assert!(!g.is_merged(1, 1, 1));

        g.set_merged(1, 1, 1, true);
        assert!(g.is_merged(1, 1, 1));
        g.clear_merged();
        assert!(!g.is_merged(1, 1, 1));
        assert!(g.is_filled(1, 1, 1));
    }

    #[test]
    fn region_fill_is_clipped() {
        let mut g = grid(4, 4, 4);
        g.set_filled_region((-2, -2, -2), (2, 1, 10), true);
        assert_eq!(g.filled_count(), 2 * 1 * 4);
        assert!(g.is_filled(1, 0, 3));
        assert!(!g.is_filled(2, 0, 0));

        // Inverted ranges are empty.
        g.set_filled_region((3, 3, 3), (1, 1, 1), true);
        assert_eq!(g.filled_count(), 8);
    }

    #[test]
    fn iter_filled_recovers_coordinates() {
        let mut g = grid(3, 4, 5);
        g.set_filled(2, 3, 4, true);
        g.set_filled(1, 0, 2, true);
        let cells: Vec<_> = g.iter_filled().collect();
        assert_eq!(cells, vec![(1, 0, 2), (2, 3, 4)]);
    }

    #[test]
    fn world_to_cell_uses_cell_size() {
        let g = OccupancyGrid::new((4, 2, 4), (0.5, 2.0, 0.5)).unwrap();
        assert_eq!(g.world_to_cell(Vector3::new(0.75, 3.9, 1.99)), Some((1, 1, 3)));
        assert_eq!(g.world_to_cell(Vector3::new(-0.1, 0.0, 0.0)), None);
        assert_eq!(g.world_to_cell(Vector3::new(0.0, 4.0, 0.0)), None);

        let c = g.cell_center(1, 1, 3);
        assert!((c - Vector3::new(0.75, 3.0, 1.75)).norm() < 1.0e-6);
        assert!((g.world_size() - Vector3::new(2.0, 4.0, 2.0)).norm() < 1.0e-6);
    }
}
