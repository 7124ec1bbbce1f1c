use crate::{
    error::PhysicsError,
    grid::{CellCoord, OccupancyGrid},
    merger::merge_boxes,
    physics::PhysicsWorld,
    sync::{CollisionBodySync, SyncReport},
    voxel_box::VoxelBox,
};

/// A voxel landscape installed as static collision geometry.
///
/// Owns the occupancy grid, the box list from the latest merge pass and the bodies installed
/// for those boxes. Edits go through the landscape so it knows when a new merge pass is due;
/// [`VoxelLandscape::update`] is cheap when nothing changed.
pub struct VoxelLandscape<W: PhysicsWorld> {
    grid: OccupancyGrid,
    boxes: Vec<VoxelBox>,
    sync: CollisionBodySync<W>,
    dirty: bool,
    revision: u64,
}

impl<W: PhysicsWorld> VoxelLandscape<W> {
    /// Wrap a grid. Nothing is installed until the first [`VoxelLandscape::update`].
    pub fn new(grid: OccupancyGrid) -> Self {
        Self {
            grid,
            boxes: Vec::new(),
            sync: CollisionBodySync::new(),
            dirty: true,
            revision: 0,
        }
    }

    #[inline]
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Mutable grid access for bulk generation. Marks the landscape dirty.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut OccupancyGrid {
        self.dirty = true;
        &mut self.grid
    }

    /// Set one cell; out-of-bounds writes are ignored. Only a real change marks the
    /// landscape dirty.
    pub fn set_filled(&mut self, xi: CellCoord, yi: CellCoord, zi: CellCoord, value: bool) {
        if self.grid.index(xi, yi, zi).is_some() && self.grid.is_filled(xi, yi, zi) != value {
            self.grid.set_filled(xi, yi, zi, value);
            self.dirty = true;
        }
    }

    #[inline]
    pub fn is_filled(&self, xi: CellCoord, yi: CellCoord, zi: CellCoord) -> bool {
        self.grid.is_filled(xi, yi, zi)
    }

    /// Whether occupancy changed since the last completed update.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Box list from the latest completed merge pass.
    ///
    /// Read-only snapshot for renderers; it only changes inside [`VoxelLandscape::update`].
    #[inline]
    pub fn boxes(&self) -> &[VoxelBox] {
        &self.boxes
    }

    /// Bumped every time [`VoxelLandscape::update`] installs a new box list.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of box bodies installed in the physics world.
    #[inline]
    pub fn body_count(&self) -> usize {
        self.sync.len()
    }

    #[inline]
    pub fn body_sync(&self) -> &CollisionBodySync<W> {
        &self.sync
    }

    /// Re-merge the grid and sync the physics world, if anything changed.
    ///
    /// Returns `Ok(None)` when the landscape was clean. On a physics error the new box list is
    /// still published (it reflects the grid), the landscape stays dirty, and the next call
    /// retries the sync.
    pub fn update(&mut self, world: &mut W) -> Result<Option<SyncReport>, PhysicsError> {
        if !self.dirty {
            return Ok(None);
        }
        self.force_update(world).map(Some)
    }

    /// Re-merge and sync unconditionally.
    pub fn force_update(&mut self, world: &mut W) -> Result<SyncReport, PhysicsError> {
        let boxes = merge_boxes(&mut self.grid);
        self.boxes = boxes;
        self.revision += 1;

        let report = self
            .sync
            .sync(world, &self.boxes, self.grid.cell_size())?;
        self.dirty = false;

        log::info!(
            "{} voxel physics bodies ({} filled cells)",
            self.sync.len(),
            self.grid.filled_count()
        );

        Ok(report)
    }

    /// Remove every box body from `world`, e.g. before dropping the landscape.
    pub fn uninstall(&mut self, world: &mut W) -> Result<usize, PhysicsError> {
        let removed = self.sync.clear(world)?;
        self.dirty = true;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::tests::RecordingWorld;

    fn landscape(nx: usize, ny: usize, nz: usize) -> VoxelLandscape<RecordingWorld> {
        VoxelLandscape::new(OccupancyGrid::new((nx, ny, nz), (1.0, 1.0, 1.0)).unwrap())
    }

    #[test]
    fn update_is_skipped_when_clean() {
        let mut world = RecordingWorld::default();
        let mut land = landscape(2, 1, 1);
        land.grid_mut().fill_all(true);

        let first = land.update(&mut world).unwrap();
        assert!(first.is_some());
        assert_eq!(land.revision(), 1);
        assert!(land.update(&mut world).unwrap().is_none());
        assert_eq!(land.revision(), 1);

        // Writing the value a cell already has is not an edit.
        land.set_filled(0, 0, 0, true);
        land.set_filled(5, 0, 0, false);
        assert!(!land.is_dirty());
    }

    #[test]
    fn editing_one_box_leaves_the_other_body_alone() {
        // Two separated slabs: B1 along x at y=0, B2 a single cell at y=2.
        let mut world = RecordingWorld::default();
        let mut land = landscape(3, 3, 1);
        for x in 0..3 {
            land.set_filled(x, 0, 0, true);
        }
        land.set_filled(0, 2, 0, true);
        land.update(&mut world).unwrap();

        let b1 = VoxelBox::new([0, 0, 0], [3, 1, 1]);
        let b2 = VoxelBox::new([0, 2, 0], [1, 1, 1]);
        assert_eq!(land.boxes(), &[b1, b2]);
        let b1_body = land.body_sync().handle(&b1).unwrap();
        let b2_body = land.body_sync().handle(&b2).unwrap();

        land.set_filled(1, 0, 0, false);
        let report = land.update(&mut world).unwrap().unwrap();

        assert_eq!(report.removed, vec![b1]);
        assert_eq!(
            report.added,
            vec![
                VoxelBox::new([0, 0, 0], [1, 1, 1]),
                VoxelBox::new([2, 0, 0], [1, 1, 1]),
            ]
        );
        assert_eq!(world.removed, vec![b1_body]);
        assert_eq!(land.body_sync().handle(&b2), Some(b2_body));
        assert_eq!(land.body_count(), 3);
    }

    #[test]
    fn failed_sync_keeps_landscape_dirty() {
        let mut world = RecordingWorld::failing_after(0);
        let mut land = landscape(1, 1, 1);
        land.set_filled(0, 0, 0, true);

        assert!(land.update(&mut world).is_err());
        assert!(land.is_dirty());
        assert_eq!(land.boxes().len(), 1);

        world.fail_add_after = None;
        let report = land.update(&mut world).unwrap().unwrap();
        assert_eq!(report.added.len(), 1);
        assert!(!land.is_dirty());
    }

    #[test]
    fn uninstall_removes_bodies() {
        let mut world = RecordingWorld::default();
        let mut land = landscape(2, 2, 2);
        land.grid_mut().set_filled_region((0, 0, 0), (1, 2, 2), true);
        land.update(&mut world).unwrap();
        assert_eq!(world.live.len(), 1);

        assert_eq!(land.uninstall(&mut world).unwrap(), 1);
        assert!(world.live.is_empty());
        assert!(land.is_dirty());
    }
}
