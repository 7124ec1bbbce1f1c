use bevy::prelude::*;

use crate::physics::{Simulation, step_scene, to_quat, to_vec3};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_ball.run_if(resource_exists::<Simulation>));
    app.add_systems(
        Update,
        follow_body
            .after(step_scene)
            .run_if(resource_exists::<Simulation>),
    );
}

/// Render proxy of the simulated ball.
#[derive(Component)]
pub struct Ball;

fn spawn_ball(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim: Res<Simulation>,
) {
    let (Some(spec), Some(pos)) = (sim.settings().ball, sim.ball_translation()) else {
        return;
    };

    commands.spawn((
        Ball,
        Mesh3d(meshes.add(Sphere::new(spec.radius).mesh().uv(32, 18))),
        MeshMaterial3d(materials.add(Color::srgb_u8(230, 120, 60))),
        Transform::from_translation(to_vec3(pos)),
    ));
}

fn follow_body(sim: Res<Simulation>, mut ball: Query<&mut Transform, With<Ball>>) {
    let Ok(mut tf) = ball.single_mut() else {
        return;
    };
    if let Some(pos) = sim.ball_translation() {
        tf.translation = to_vec3(pos);
    }
    if let Some(rot) = sim.ball_rotation() {
        tf.rotation = to_quat(rot);
    }
}
