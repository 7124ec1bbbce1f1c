//! Owns the simulated [`VoxelScene`] and advances it once per rendered frame.

use bevy::prelude::*;
use landscape::{SceneSettings, VoxelScene};
use nalgebra::{UnitQuaternion, Vector3};

/// The physics scene. Absent if it failed to build, in which case nothing is simulated.
#[derive(Resource, Deref, DerefMut)]
pub struct Simulation(pub VoxelScene);

pub(super) fn plugin(app: &mut App) {
    match VoxelScene::build(SceneSettings::default()) {
        Ok(scene) => {
            app.insert_resource(Simulation(scene));
        }
        Err(err) => error!("Failed to build voxel scene: {err}"),
    }

    app.add_systems(Update, step_scene.run_if(resource_exists::<Simulation>));
}

/// Sync pending landscape edits, then step physics by the frame's elapsed time.
pub(crate) fn step_scene(mut scene: ResMut<Simulation>, time: Res<Time>) {
    match scene.frame(time.delta()) {
        Ok(report) => {
            if let Some(sync) = report.sync.filter(|s| !s.is_noop()) {
                debug!(
                    "landscape synced: +{} -{} ({} kept)",
                    sync.added.len(),
                    sync.removed.len(),
                    sync.kept
                );
            }
        }
        Err(err) => error!("Voxel scene frame failed: {err}"),
    }
}

#[inline]
pub(crate) fn to_vec3(v: Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub(crate) fn to_quat(q: UnitQuaternion<f32>) -> Quat {
    let c = q.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}
