use std::time::Duration;

/// Default number of cells along X for the demo landscape.
pub const GRID_NX: usize = 50;

/// Default number of cells along Y (height) for the demo landscape.
pub const GRID_NY: usize = 8;

/// Default number of cells along Z for the demo landscape.
pub const GRID_NZ: usize = 50;

/// Size of one grid cell in world units (meters).
/// All default cells are cubes.
pub const CELL_SIZE: f32 = 0.5;

/// Downward gravity magnitude in meters per second squared (positive value).
///
/// Stronger than earth gravity; the demo ball feels floaty at 9.81.
pub const GRAVITY_MPS2: f32 = 20.0;

/// Radius of the dynamic demo ball (meters).
pub const BALL_RADIUS: f32 = 1.3;

/// Mass of the dynamic demo ball (kilograms).
pub const BALL_MASS: f32 = 5.0;

/// Linear damping applied to the demo ball.
pub const BALL_LINEAR_DAMPING: f32 = 0.9;

/// Friction coefficient shared by every collider in the scene.
///
/// Convention:
/// - 0.0 = perfectly slippery (current behavior)
/// - 1.0 = very grippy
pub const CONTACT_FRICTION: f32 = 0.0;

/// Restitution (bounciness) shared by every collider in the scene.
pub const CONTACT_RESTITUTION: f32 = 0.3;

/// Fixed physics timestep.
pub const FIXED_TIMESTEP: Duration = Duration::from_micros(16_667);

/// Upper bound on physics substeps per rendered frame.
///
/// A long frame (tab switch, debugger pause) would otherwise queue an unbounded number of
/// steps and stall every following frame.
pub const MAX_SUBSTEPS_PER_FRAME: u32 = 5;
