use crate::ball::Ball;
use bevy::{core_pipeline::tonemapping::Tonemapping, prelude::*};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(PostUpdate, follow_ball);
}

const CAMERA_OFFSET_GLOBAL: Vec3 = Vec3::new(0.0, 14.0, -18.0);
const CAMERA_DECAY_RATE: f32 = 4.0;

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Tonemapping::AcesFitted,
        Camera3d::default(),
        Transform::from_translation(CAMERA_OFFSET_GLOBAL).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                200.0, // Fog distance
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
    ));
}

fn follow_ball(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    ball: Single<&Transform, (With<Ball>, Without<Camera3d>)>,
    time: Res<Time>,
) {
    let Ok(mut cam_tf) = camera_query.single_mut() else {
        return;
    };

    let target = ball.translation + CAMERA_OFFSET_GLOBAL;
    cam_tf
        .translation
        .smooth_nudge(&target, CAMERA_DECAY_RATE, time.delta_secs());
    cam_tf.look_at(ball.translation, Vec3::Y);
}
