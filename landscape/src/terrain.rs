//! Procedural occupancy for the demo scene.

use crate::grid::{CellCoord, OccupancyGrid};

/// Rolling sine hills.
///
/// A column at `(x, z)` is filled up to a height that follows
/// `sin(frequency * x) * sin(frequency * z)`, remapped from `[-1, 1]` to the full grid height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainSettings {
    /// Angular frequency per cell along X and Z.
    pub frequency: f32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self { frequency: 0.1 }
    }
}

impl TerrainSettings {
    /// Whether the cell `(x, y, z)` is solid for a grid `ny` cells tall.
    ///
    /// A cell is empty when the surface value lies below its normalized height
    /// `2 * y / ny - 1`.
    #[inline]
    pub fn is_solid(&self, x: usize, y: usize, z: usize, ny: usize) -> bool {
        let surface = (x as f32 * self.frequency).sin() * (z as f32 * self.frequency).sin();
        let level = y as f32 / ny as f32 * 2.0 - 1.0;
        surface >= level
    }

    /// Overwrite every cell of `grid` with the hill pattern.
    pub fn generate(&self, grid: &mut OccupancyGrid) {
        let (nx, ny, nz) = grid.dims();
        for x in 0..nx {
            for y in 0..ny {
                for z in 0..nz {
                    let solid = self.is_solid(x, y, z, ny);
                    grid.set_filled(x as CellCoord, y as CellCoord, z as CellCoord, solid);
                }
            }
        }
        log::debug!(
            "generated sine terrain: {} of {} cells filled",
            grid.filled_count(),
            grid.cell_count()
        );
    }
}
