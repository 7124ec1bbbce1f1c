//! The physics collaborator as seen by the landscape.
//!
//! The landscape only needs to install and remove static bodies and to advance the simulation.
//! Contact resolution, integration and broad-phase stay inside the engine.

use std::fmt::Debug;

use crate::{error::PhysicsError, rapier::StaticBodyDef};

pub trait PhysicsWorld {
    /// Engine-side identifier of an installed body.
    type BodyHandle: Copy + Eq + Debug;

    /// Install a zero-mass body with a single collider.
    fn add_body(&mut self, def: &StaticBodyDef) -> Result<Self::BodyHandle, PhysicsError>;

    /// Remove a body (and its colliders) previously returned by [`PhysicsWorld::add_body`].
    fn remove_body(&mut self, handle: Self::BodyHandle) -> Result<(), PhysicsError>;

    /// Advance the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);
}
