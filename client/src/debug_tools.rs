//! Debug/performance tooling for native dev builds.
//!
//! Compiled only with `dev_native` (see `main.rs`).

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;

use crate::physics::{Simulation, to_vec3};

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(
        Update,
        draw_box_outlines.run_if(resource_exists::<Simulation>),
    );
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

/// Outline every merged box, which makes the merge result visible through the shaded meshes.
fn draw_box_outlines(mut gizmos: Gizmos, sim: Res<Simulation>) {
    let landscape = sim.landscape();
    let cell = landscape.grid().cell_size();
    for b in landscape.boxes() {
        let tf = Transform::from_translation(to_vec3(b.world_center(cell)))
            .with_scale(to_vec3(b.world_size(cell)));
        gizmos.cuboid(tf, Color::srgb(1.0, 0.9, 0.2));
    }
}
