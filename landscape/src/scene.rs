//! The simulated scene: a voxel landscape, a ground plane and a dynamic ball in one
//! Rapier world, driven once per rendered frame.
//!
//! Frame order is fixed: pending landscape edits are merged and synced first, then physics
//! steps on the fixed timestep. The two never interleave within a frame.

use std::time::Duration;

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::*;

use crate::{
    error::{PhysicsError, SceneError},
    grid::{CellCoord, OccupancyGrid},
    landscape::VoxelLandscape,
    physics::PhysicsWorld,
    rapier::StaticBodyDef,
    rapier_world::RapierWorld,
    settings::SceneSettings,
    stepper::FixedStepper,
    sync::SyncReport,
    utils::LogStopwatch,
};

/// What happened during one [`VoxelScene::frame`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Landscape sync performed before stepping, if the landscape was dirty.
    pub sync: Option<SyncReport>,
    /// Number of fixed physics steps taken.
    pub steps: u32,
}

pub struct VoxelScene {
    settings: SceneSettings,
    world: RapierWorld,
    landscape: VoxelLandscape<RapierWorld>,
    stepper: FixedStepper,
    ground: Option<RigidBodyHandle>,
    ball: Option<RigidBodyHandle>,
}

impl VoxelScene {
    /// Build the physics world, generate the landscape and install it.
    pub fn build(settings: SceneSettings) -> Result<Self, SceneError> {
        if settings.fixed_timestep.is_zero() || settings.max_substeps == 0 {
            return Err(SceneError::InvalidStepping {
                fixed_timestep: settings.fixed_timestep,
                max_substeps: settings.max_substeps,
            });
        }

        let mut sw = LogStopwatch::new("VoxelScene::build");

        let grid = OccupancyGrid::new(settings.dims, settings.cell_size)?;
        let mut world = RapierWorld::new(vector![0.0, -settings.gravity, 0.0], settings.material);

        let ground = if settings.ground_plane {
            Some(world.add_body(&StaticBodyDef::ground_plane(0.0))?)
        } else {
            None
        };

        sw.span("terrain");
        let mut landscape = VoxelLandscape::new(grid);
        settings.terrain.generate(landscape.grid_mut());

        sw.span("install");
        landscape.update(&mut world)?;

        let drop_point = ball_drop_point(&settings, landscape.grid());
        let ball = settings
            .ball
            .map(|spec| world.add_dynamic_ball(spec, drop_point))
            .transpose()?;

        log::info!(
            "scene ready: {} voxel bodies, {} bodies total",
            landscape.body_count(),
            world.body_count()
        );

        Ok(Self {
            stepper: FixedStepper::new(settings.fixed_timestep, settings.max_substeps),
            settings,
            world,
            landscape,
            ground,
            ball,
        })
    }

    #[inline]
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    #[inline]
    pub fn world(&self) -> &RapierWorld {
        &self.world
    }

    #[inline]
    pub fn landscape(&self) -> &VoxelLandscape<RapierWorld> {
        &self.landscape
    }

    /// Edit access to the landscape. Edits are installed on the next frame.
    #[inline]
    pub fn landscape_mut(&mut self) -> &mut VoxelLandscape<RapierWorld> {
        &mut self.landscape
    }

    #[inline]
    pub fn ground(&self) -> Option<RigidBodyHandle> {
        self.ground
    }

    #[inline]
    pub fn ball(&self) -> Option<RigidBodyHandle> {
        self.ball
    }

    pub fn ball_translation(&self) -> Option<Vector<f32>> {
        self.ball.and_then(|h| self.world.body_translation(h))
    }

    pub fn ball_rotation(&self) -> Option<UnitQuaternion<f32>> {
        self.ball.and_then(|h| self.world.body_rotation(h))
    }

    /// Advance the scene by one rendered frame of length `elapsed`.
    ///
    /// Syncs the landscape if it was edited, then runs as many fixed steps as the accumulated
    /// time allows.
    pub fn frame(&mut self, elapsed: Duration) -> Result<FrameReport, PhysicsError> {
        let sync = self.landscape.update(&mut self.world)?;
        if sync.as_ref().is_some_and(|report| !report.is_noop()) {
            // Bodies resting on removed boxes must notice the ground is gone.
            if let Some(ball) = self.ball {
                self.world.wake_body(ball);
            }
        }

        let steps = self.stepper.advance(elapsed);
        let dt = self.stepper.step_secs();
        for _ in 0..steps {
            self.world.step(dt);
        }

        Ok(FrameReport { sync, steps })
    }

    /// Clear every cell whose center lies within `radius` of the world point `center`.
    ///
    /// Returns the number of cells that changed. The landscape is re-merged on the next frame.
    pub fn carve_sphere(&mut self, center: Vector<f32>, radius: f32) -> usize {
        let grid = self.landscape.grid();
        let cell = grid.cell_size();
        let (nx, ny, nz) = grid.dims();
        let lo = (center - Vector::repeat(radius)).component_div(&cell);
        let hi = (center + Vector::repeat(radius)).component_div(&cell);

        // Cell range covered by the sphere's bounds, clipped to the grid.
        let clip = |lo: f32, hi: f32, dim: usize| {
            let lo = lo.floor().max(0.0) as CellCoord;
            let hi = hi.floor().min(dim as f32 - 1.0) as CellCoord;
            lo..=hi
        };

        let mut cells = Vec::new();
        for x in clip(lo.x, hi.x, nx) {
            for y in clip(lo.y, hi.y, ny) {
                for z in clip(lo.z, hi.z, nz) {
                    let inside = (grid.cell_center(x, y, z) - center).norm() <= radius;
                    if inside && grid.is_filled(x, y, z) {
                        cells.push((x, y, z));
                    }
                }
            }
        }

        for &(x, y, z) in &cells {
            self.landscape.set_filled(x, y, z, false);
        }
        log::debug!("carved {} cells around {:?}", cells.len(), center);
        cells.len()
    }

    /// Regenerate the terrain from the scene settings, undoing every edit.
    pub fn regenerate_terrain(&mut self) {
        let terrain = self.settings.terrain;
        terrain.generate(self.landscape.grid_mut());
    }

    /// Drop the ball again from its starting point and forget any pending simulation time.
    pub fn reset_ball(&mut self) -> Result<(), PhysicsError> {
        let Some(ball) = self.ball else {
            return Ok(());
        };
        let drop_point = ball_drop_point(&self.settings, self.landscape.grid());
        self.world.reset_body(ball, drop_point)?;
        // Time accumulated before the reset belongs to the old trajectory.
        self.stepper.reset();
        Ok(())
    }
}

/// Above the middle of the landscape, one ball diameter over its top.
fn ball_drop_point(settings: &SceneSettings, grid: &OccupancyGrid) -> Vector<f32> {
    let size = grid.world_size();
    let radius = settings.ball.map_or(0.0, |b| b.radius);
    vector![size.x * 0.5, size.y + radius * 2.0, size.z * 0.5]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rapier_world::BallSpec, terrain::TerrainSettings};

    fn small_settings() -> SceneSettings {
        SceneSettings {
            dims: (12, 4, 12),
            cell_size: (1.0, 1.0, 1.0),
            ball: Some(BallSpec {
                radius: 0.5,
                mass: 5.0,
                linear_damping: 0.9,
            }),
            terrain: TerrainSettings { frequency: 0.3 },
            ..Default::default()
        }
    }

    #[test]
    fn build_installs_ground_landscape_and_ball() {
        let scene = VoxelScene::build(small_settings()).unwrap();
        let boxes = scene.landscape().boxes().len();

        assert!(boxes > 0);
        assert_eq!(scene.landscape().body_count(), boxes);
        assert_eq!(scene.world().body_count(), boxes + 2);
        assert!(!scene.landscape().is_dirty());

        let ball = scene.ball_translation().unwrap();
        assert!((ball - vector![6.0, 5.0, 6.0]).norm() < 1.0e-6);
    }

    #[test]
    fn default_scene_matches_demo_layout() {
        let scene = VoxelScene::build(SceneSettings::default()).unwrap();
        assert_eq!(scene.landscape().grid().dims(), (50, 8, 50));
        assert!(scene.ground().is_some());

        // (50 * 0.5 / 2, 8 * 0.5 + 2 * 1.3, 50 * 0.5 / 2)
        let ball = scene.ball_translation().unwrap();
        assert!((ball - vector![12.5, 6.6, 12.5]).norm() < 1.0e-5);
    }

    #[test]
    fn invalid_settings_fail_fast() {
        let settings = SceneSettings {
            dims: (0, 4, 4),
            ..small_settings()
        };
        assert!(matches!(
            VoxelScene::build(settings),
            Err(SceneError::Grid(_))
        ));
    }

    #[test]
    fn zero_timestep_or_substeps_fail_fast() {
        let zero_step = SceneSettings {
            fixed_timestep: Duration::ZERO,
            ..small_settings()
        };
        assert!(matches!(
            VoxelScene::build(zero_step),
            Err(SceneError::InvalidStepping { .. })
        ));

        let zero_substeps = SceneSettings {
            max_substeps: 0,
            ..small_settings()
        };
        assert!(matches!(
            VoxelScene::build(zero_substeps),
            Err(SceneError::InvalidStepping { max_substeps: 0, .. })
        ));
    }

    #[test]
    fn frames_step_on_the_fixed_timestep() {
        let mut scene = VoxelScene::build(small_settings()).unwrap();
        let start = scene.ball_translation().unwrap();

        let report = scene.frame(Duration::ZERO).unwrap();
        assert_eq!(report, FrameReport::default());

        let mut steps = 0;
        for _ in 0..30 {
            steps += scene.frame(Duration::from_millis(16)).unwrap().steps;
        }
        assert!((28..=29).contains(&steps), "took {steps} steps");
        assert!(scene.ball_translation().unwrap().y < start.y);
    }

    #[test]
    fn ball_lands_on_the_landscape() {
        let mut scene = VoxelScene::build(small_settings()).unwrap();
        for _ in 0..240 {
            scene.frame(Duration::from_micros(16_667)).unwrap();
        }
        let pos = scene.ball_translation().unwrap();
        // Resting on voxels, not on the ground plane underneath them.
        assert!(pos.y > 1.0, "ball fell through to y = {}", pos.y);
        assert!(pos.y < 5.0, "ball never landed: y = {}", pos.y);
    }

    #[test]
    fn edits_sync_before_stepping() {
        let mut scene = VoxelScene::build(small_settings()).unwrap();
        let before = scene.landscape().boxes().to_vec();

        let carved = scene.carve_sphere(vector![6.0, 2.0, 6.0], 1.5);
        assert!(carved > 0);
        assert!(scene.landscape().is_dirty());

        let report = scene.frame(Duration::ZERO).unwrap();
        let sync = report.sync.unwrap();
        assert!(!sync.removed.is_empty());
        assert!(sync.kept > 0);
        assert_eq!(report.steps, 0);

        // Bodies that survived are exactly the boxes present in both passes.
        let after = scene.landscape().boxes();
        let shared = before.iter().filter(|b| after.contains(b)).count();
        assert_eq!(shared, sync.kept);
        assert_eq!(
            scene.world().body_count(),
            after.len() + 2,
            "ground + ball + boxes"
        );
    }

    #[test]
    fn carving_is_clipped_to_the_grid() {
        let mut scene = VoxelScene::build(small_settings()).unwrap();
        let filled = scene.landscape().grid().filled_count();

        // Nowhere near the grid.
        assert_eq!(scene.carve_sphere(vector![-500.0, 0.0, 0.0], 10.0), 0);
        assert!(!scene.landscape().is_dirty());

        // Bounds far larger than the grid only visit the grid's own cells.
        assert_eq!(scene.carve_sphere(vector![6.0, 2.0, 6.0], 1.0e6), filled);
        assert_eq!(scene.landscape().grid().filled_count(), 0);

        let report = scene.frame(Duration::ZERO).unwrap();
        assert!(report.sync.unwrap().added.is_empty());
        assert!(scene.landscape().boxes().is_empty());
    }

    #[test]
    fn regenerate_restores_carved_cells() {
        let mut scene = VoxelScene::build(small_settings()).unwrap();
        let original = scene.landscape().boxes().to_vec();

        scene.carve_sphere(vector![3.0, 1.0, 3.0], 2.0);
        scene.frame(Duration::ZERO).unwrap();
        assert_ne!(scene.landscape().boxes(), original.as_slice());

        scene.regenerate_terrain();
        scene.frame(Duration::ZERO).unwrap();
        assert_eq!(scene.landscape().boxes(), original.as_slice());
    }

    #[test]
    fn reset_ball_returns_to_drop_point() {
        let mut scene = VoxelScene::build(small_settings()).unwrap();
        for _ in 0..20 {
            scene.frame(Duration::from_millis(16)).unwrap();
        }
        scene.reset_ball().unwrap();
        let pos = scene.ball_translation().unwrap();
        assert!((pos - vector![6.0, 5.0, 6.0]).norm() < 1.0e-6);
    }

    #[test]
    fn reset_ball_drops_pending_step_time() {
        let mut scene = VoxelScene::build(small_settings()).unwrap();
        assert_eq!(scene.frame(Duration::from_millis(10)).unwrap().steps, 0);
        assert_eq!(scene.stepper.pending(), Duration::from_millis(10));

        scene.reset_ball().unwrap();
        assert_eq!(scene.stepper.pending(), Duration::ZERO);

        // 10 ms alone is less than one step.
        assert_eq!(scene.frame(Duration::from_millis(10)).unwrap().steps, 0);
        assert!((scene.ball_translation().unwrap() - vector![6.0, 5.0, 6.0]).norm() < 1.0e-6);
    }
}
