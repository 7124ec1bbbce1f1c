pub mod constants;
pub mod error;
pub mod grid;
pub mod landscape;
pub mod merger;
pub mod physics;
pub mod rapier;
pub mod rapier_world;
pub mod scene;
pub mod settings;
pub mod stepper;
pub mod sync;
pub mod terrain;
pub mod utils;
pub mod voxel_box;

pub use error::{GridError, PhysicsError, SceneError};
pub use grid::{CellCoord, OccupancyGrid};
pub use landscape::VoxelLandscape;
pub use merger::{MergeStats, merge_boxes};
pub use physics::PhysicsWorld;
pub use rapier::{ColliderShapeDef, ContactMaterial, StaticBodyDef, collider_from_def};
pub use rapier_world::{BallSpec, RapierWorld};
pub use scene::{FrameReport, VoxelScene};
pub use settings::SceneSettings;
pub use stepper::FixedStepper;
pub use sync::{CollisionBodySync, SyncReport};
pub use terrain::TerrainSettings;
pub use voxel_box::VoxelBox;
