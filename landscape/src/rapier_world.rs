//! Rapier-backed simulation world.
//!
//! This module owns every Rapier structure needed to step a scene made of static voxel boxes,
//! a ground plane and a handful of dynamic bodies.
//!
//! Design goals
//! - Static geometry goes through [`PhysicsWorld`], so the landscape never touches Rapier sets.
//! - Every collider gets the same [`ContactMaterial`], matching a single scene-wide material.
//! - The world never steps on its own; the caller drives it with a fixed timestep.

// Re-export Rapier so the client can name handles and math types without depending on
// `rapier3d` directly.
pub use rapier3d;

use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use crate::{
    error::PhysicsError,
    physics::PhysicsWorld,
    rapier::{ColliderShapeDef, ContactMaterial, StaticBodyDef, collider_from_def},
};

/// Parameters of a dynamic sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallSpec {
    pub radius: f32,
    pub mass: f32,
    pub linear_damping: f32,
}

pub struct RapierWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    gravity: Vector<f32>,
    material: ContactMaterial,
}

impl RapierWorld {
    pub fn new(gravity: Vector<f32>, material: ContactMaterial) -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            gravity,
            material,
        }
    }

    #[inline]
    pub fn gravity(&self) -> Vector<f32> {
        self.gravity
    }

    /// Number of rigid bodies currently in the world (static and dynamic).
    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Insert a dynamic sphere at `translation`.
    pub fn add_dynamic_ball(
        &mut self,
        spec: BallSpec,
        translation: Vector<f32>,
    ) -> Result<RigidBodyHandle, PhysicsError> {
        ColliderShapeDef::Sphere {
            radius: spec.radius,
        }
        .validate()?;
        if !(spec.mass.is_finite() && spec.mass > 0.0) {
            return Err(PhysicsError::InvalidShape(format!(
                "dynamic ball mass {}",
                spec.mass
            )));
        }

        let rb = RigidBodyBuilder::dynamic()
            .translation(translation)
            .linear_damping(spec.linear_damping)
            .build();
        let handle = self.bodies.insert(rb);

        let collider = ColliderBuilder::ball(spec.radius)
            .mass(spec.mass)
            .friction(self.material.friction)
            .restitution(self.material.restitution)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        Ok(handle)
    }

    /// World-space translation of a body.
    pub fn body_translation(&self, handle: RigidBodyHandle) -> Option<Vector<f32>> {
        self.bodies.get(handle).map(|rb| *rb.translation())
    }

    /// World-space rotation of a body.
    pub fn body_rotation(&self, handle: RigidBodyHandle) -> Option<UnitQuaternion<f32>> {
        self.bodies.get(handle).map(|rb| *rb.rotation())
    }

    /// Wake a body up, e.g. after the geometry it rests on was removed.
    pub fn wake_body(&mut self, handle: RigidBodyHandle) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.wake_up(true);
        }
    }

    /// Teleport a body and clear its velocities.
    pub fn reset_body(
        &mut self,
        handle: RigidBodyHandle,
        translation: Vector<f32>,
    ) -> Result<(), PhysicsError> {
        let rb = self
            .bodies
            .get_mut(handle)
            .ok_or_else(|| PhysicsError::UnknownBody(format!("{handle:?}")))?;
        rb.set_translation(translation, true);
        rb.set_rotation(UnitQuaternion::identity(), true);
        rb.set_linvel(Vector::zeros(), true);
        rb.set_angvel(Vector::zeros(), true);
        Ok(())
    }
}

impl PhysicsWorld for RapierWorld {
    type BodyHandle = RigidBodyHandle;

    fn add_body(&mut self, def: &StaticBodyDef) -> Result<RigidBodyHandle, PhysicsError> {
        // Build the collider first so a rejected shape leaves the world untouched.
        let collider = collider_from_def(def, self.material)?;

        let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
        let rb = RigidBodyBuilder::fixed().pose(iso).build();
        let handle = self.bodies.insert(rb);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        Ok(handle)
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) -> Result<(), PhysicsError> {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .map(|_| ())
            .ok_or_else(|| PhysicsError::UnknownBody(format!("{handle:?}")))
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel_box::VoxelBox;

    fn world() -> RapierWorld {
        RapierWorld::new(vector![0.0, -20.0, 0.0], ContactMaterial::default())
    }

    const BALL: BallSpec = BallSpec {
        radius: 0.5,
        mass: 5.0,
        linear_damping: 0.9,
    };

    #[test]
    fn static_box_is_fixed_and_placed_at_center() {
        let mut w = world();
        let def = StaticBodyDef::from_voxel_box(
            &VoxelBox::new([2, 0, 0], [2, 1, 1]),
            vector![0.5, 0.5, 0.5],
        );
        let handle = w.add_body(&def).unwrap();

        let rb = &w.bodies[handle];
        assert!(rb.is_fixed());
        assert!((rb.translation() - vector![1.5, 0.25, 0.25]).norm() < 1.0e-6);
        assert_eq!(rb.colliders().len(), 1);
        assert_eq!(w.colliders.len(), 1);
    }

    #[test]
    fn rejected_shape_leaves_world_untouched() {
        let mut w = world();
        let def = StaticBodyDef {
            translation: vector![0.0, 0.0, 0.0],
            rotation: UnitQuaternion::identity(),
            shape: ColliderShapeDef::Cuboid {
                half_extents: vector![0.0, 1.0, 1.0],
            },
        };
        assert!(matches!(
            w.add_body(&def),
            Err(PhysicsError::InvalidShape(_))
        ));
        assert_eq!(w.body_count(), 0);
        assert_eq!(w.colliders.len(), 0);
    }

    #[test]
    fn removing_twice_reports_unknown_body() {
        let mut w = world();
        let handle = w.add_body(&StaticBodyDef::ground_plane(0.0)).unwrap();

        w.remove_body(handle).unwrap();
        assert_eq!(w.body_count(), 0);
        assert_eq!(w.colliders.len(), 0);
        assert!(matches!(
            w.remove_body(handle),
            Err(PhysicsError::UnknownBody(_))
        ));
    }

    #[test]
    fn ball_falls_under_gravity() {
        let mut w = world();
        let ball = w.add_dynamic_ball(BALL, vector![0.0, 10.0, 0.0]).unwrap();

        for _ in 0..10 {
            w.step(1.0 / 60.0);
        }
        let y = w.body_translation(ball).unwrap().y;
        assert!(y < 10.0, "ball did not fall: y = {y}");
    }

    #[test]
    fn ball_comes_to_rest_on_a_voxel_box() {
        let mut w = world();
        // 10x1x10 slab of unit cells centered under the ball; top face at y = 1.
        let slab = VoxelBox::new([0, 0, 0], [10, 1, 10]);
        w.add_body(&StaticBodyDef::from_voxel_box(&slab, vector![1.0, 1.0, 1.0]))
            .unwrap();
        let ball = w.add_dynamic_ball(BALL, vector![5.0, 3.0, 5.0]).unwrap();

        for _ in 0..300 {
            w.step(1.0 / 60.0);
        }
        let pos = w.body_translation(ball).unwrap();
        assert!((pos.y - 1.5).abs() < 0.1, "ball resting at y = {}", pos.y);
    }

    #[test]
    fn reset_body_teleports_and_stops() {
        let mut w = world();
        let ball = w.add_dynamic_ball(BALL, vector![0.0, 10.0, 0.0]).unwrap();
        for _ in 0..5 {
            w.step(1.0 / 60.0);
        }

        w.reset_body(ball, vector![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(w.body_translation(ball), Some(vector![1.0, 2.0, 3.0]));
        assert_eq!(w.bodies[ball].linvel(), &Vector::zeros());
    }

    #[test]
    fn invalid_ball_is_rejected() {
        let mut w = world();
        let bad_mass = BallSpec { mass: 0.0, ..BALL };
        assert!(w.add_dynamic_ball(bad_mass, vector![0.0, 0.0, 0.0]).is_err());
        let bad_radius = BallSpec { radius: f32::NAN, ..BALL };
        assert!(w.add_dynamic_ball(bad_radius, vector![0.0, 0.0, 0.0]).is_err());
        assert_eq!(w.body_count(), 0);
    }
}
