use rapier3d::{na::UnitQuaternion, prelude::*};

use crate::{
    constants::{CONTACT_FRICTION, CONTACT_RESTITUTION},
    error::PhysicsError,
    voxel_box::VoxelBox,
};

/// Canonical, engine-agnostic definition of an immutable (zero mass) collision body.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticBodyDef {
    /// World-space translation.
    pub translation: Vector<f32>,
    /// World-space rotation (unit quaternion).
    pub rotation: UnitQuaternion<f32>,
    /// Collider shape parameters.
    pub shape: ColliderShapeDef,
}

impl StaticBodyDef {
    /// Static body for one merged voxel box: a cuboid at the box's world center with
    /// identity rotation.
    pub fn from_voxel_box(voxel_box: &VoxelBox, cell_size: Vector<f32>) -> Self {
        Self {
            translation: voxel_box.world_center(cell_size),
            rotation: UnitQuaternion::identity(),
            shape: ColliderShapeDef::Cuboid {
                half_extents: voxel_box.world_half_extents(cell_size),
            },
        }
    }

    /// Horizontal ground plane at height `y`, facing +Y.
    pub fn ground_plane(y: f32) -> Self {
        Self {
            translation: vector![0.0, y, 0.0],
            rotation: UnitQuaternion::identity(),
            shape: ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        }
    }
}

/// Supported collider shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space).
    ///
    /// This is represented by an offset along the plane normal.
    /// The plane normal is derived from the pose as `rotation * +Y`.
    Plane {
        /// Offset along the plane normal (meters).
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vector<f32> },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },
}

impl ColliderShapeDef {
    /// Reject shapes Rapier would silently turn into NaNs or degenerate colliders.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        match self {
            ColliderShapeDef::Plane {
                offset_along_normal,
            } if !offset_along_normal.is_finite() => Err(PhysicsError::InvalidShape(format!(
                "plane offset {offset_along_normal}"
            ))),
            ColliderShapeDef::Cuboid { half_extents }
                if !half_extents.iter().copied().all(positive) =>
            {
                Err(PhysicsError::InvalidShape(format!(
                    "cuboid half extents ({}, {}, {})",
                    half_extents.x, half_extents.y, half_extents.z
                )))
            }
            ColliderShapeDef::Sphere { radius } if !positive(*radius) => Err(
                PhysicsError::InvalidShape(format!("sphere radius {radius}")),
            ),
            _ => Ok(()),
        }
    }
}

/// Surface response shared by every collider in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            friction: CONTACT_FRICTION,
            restitution: CONTACT_RESTITUTION,
        }
    }
}

/// Build a Rapier collider from a shape definition.
///
/// The pose lives on the parent rigid-body, so colliders are created in body space.
pub fn collider_from_def(
    def: &StaticBodyDef,
    material: ContactMaterial,
) -> Result<Collider, PhysicsError> {
    def.shape.validate()?;
    if !def.translation.iter().all(|v| v.is_finite()) {
        return Err(PhysicsError::InvalidShape(format!(
            "non-finite translation {:?}",
            def.translation
        )));
    }

    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // In body space the plane is `y = offset`; the body pose supplies the world
            // normal (`rotation * +Y`) and position.
            ColliderBuilder::halfspace(Vector::y_axis())
                .translation(vector![0.0, *offset_along_normal, 0.0])
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),
    };

    Ok(builder
        .friction(material.friction)
        .restitution(material.restitution)
        .build())
}
