/*!
Scene configuration.

Every field defaults to the matching value in `constants`, so `SceneSettings::default()`
reproduces the demo scene. Override fields to build smaller test scenes or different
landscapes.

Notes
- Distances are in meters, time in seconds, masses in kilograms.
- Gravity is stored as a positive magnitude and applied along -Y.
*/

use std::time::Duration;

use crate::{
    constants::{
        BALL_LINEAR_DAMPING, BALL_MASS, BALL_RADIUS, CELL_SIZE, FIXED_TIMESTEP, GRAVITY_MPS2,
        GRID_NX, GRID_NY, GRID_NZ, MAX_SUBSTEPS_PER_FRAME,
    },
    rapier::ContactMaterial,
    rapier_world::BallSpec,
    terrain::TerrainSettings,
};

#[derive(Clone, Debug, PartialEq)]
pub struct SceneSettings {
    /// Grid dimensions in cells.
    pub dims: (usize, usize, usize),
    /// Cell size in meters.
    pub cell_size: (f32, f32, f32),
    /// Downward gravity magnitude (m/s^2).
    pub gravity: f32,
    /// Scene-wide collider material.
    pub material: ContactMaterial,
    /// The dynamic ball dropped onto the landscape. `None` builds a landscape-only scene.
    pub ball: Option<BallSpec>,
    /// Add an infinite ground plane at y = 0 under the landscape.
    pub ground_plane: bool,
    /// Hill generator used to fill the grid.
    pub terrain: TerrainSettings,
    /// Fixed physics timestep.
    pub fixed_timestep: Duration,
    /// Maximum physics steps per frame.
    pub max_substeps: u32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            dims: (GRID_NX, GRID_NY, GRID_NZ),
            cell_size: (CELL_SIZE, CELL_SIZE, CELL_SIZE),
            gravity: GRAVITY_MPS2,
            material: ContactMaterial::default(),
            ball: Some(BallSpec {
                radius: BALL_RADIUS,
                mass: BALL_MASS,
                linear_damping: BALL_LINEAR_DAMPING,
            }),
            ground_plane: true,
            terrain: TerrainSettings::default(),
            fixed_timestep: FIXED_TIMESTEP,
            max_substeps: MAX_SUBSTEPS_PER_FRAME,
        }
    }
}
