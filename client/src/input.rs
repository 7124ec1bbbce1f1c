use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use crate::physics::{Simulation, step_scene};

/// Extra reach of a carved crater beyond the ball's own radius, in meters.
const CRATER_MARGIN: f32 = 1.0;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Dig a crater under the ball.
    Carve,
    /// Restore the generated terrain and drop the ball again.
    Regenerate,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Carve, KeyCode::Space);
    input_map.insert(InputAction::Regenerate, KeyCode::KeyR);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());

    app.add_systems(
        Update,
        handle_landscape_actions
            .before(step_scene)
            .run_if(resource_exists::<Simulation>),
    );
}

/// Landscape edits only mark it dirty; the merge and body sync happen in the following step.
fn handle_landscape_actions(actions: Res<ActionState<InputAction>>, mut sim: ResMut<Simulation>) {
    if actions.just_pressed(&InputAction::Carve) {
        let radius = sim.settings().ball.map_or(0.0, |b| b.radius) + CRATER_MARGIN;
        if let Some(pos) = sim.ball_translation() {
            let carved = sim.carve_sphere(pos, radius);
            info!("carved {carved} cells");
        }
    }

    if actions.just_pressed(&InputAction::Regenerate) {
        sim.regenerate_terrain();
        if let Err(err) = sim.reset_ball() {
            error!("Failed to reset ball: {err}");
        }
    }
}
