//! Error types for grid construction, physics body management and scene assembly.
//!
//! Out-of-bounds cell access is not an error: reads outside the grid
//! return `false` and writes are ignored.

use std::time::Duration;

use thiserror::Error;

/// Malformed occupancy grid construction parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {nx}x{ny}x{nz}")]
    ZeroDimension { nx: usize, ny: usize, nz: usize },

    #[error("cell size must be positive and finite, got ({sx}, {sy}, {sz})")]
    InvalidCellSize { sx: f32, sy: f32, sz: f32 },

    #[error("grid of {nx}x{ny}x{nz} cells does not fit in memory")]
    TooManyCells { nx: usize, ny: usize, nz: usize },
}

/// Failures reported by a [`crate::PhysicsWorld`] implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("invalid collider shape: {0}")]
    InvalidShape(String),

    #[error("body {0} is not part of this physics world")]
    UnknownBody(String),
}

/// Errors raised while assembling a [`crate::VoxelScene`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Physics(#[from] PhysicsError),

    #[error(
        "fixed timestep must be positive with at least one substep per frame, \
         got {fixed_timestep:?} x {max_substeps}"
    )]
    InvalidStepping {
        fixed_timestep: Duration,
        max_substeps: u32,
    },
}
