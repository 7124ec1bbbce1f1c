use bevy::prelude::*;

use crate::physics::{Simulation, step_scene, to_vec3};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, setup);
    app.add_systems(
        Update,
        rebuild_box_meshes
            .after(step_scene)
            .run_if(resource_exists::<Simulation>),
    );
}

/// A rendered merged voxel box.
#[derive(Component)]
pub struct VoxelBoxMesh;

#[derive(Resource)]
struct VoxelMeshAssets {
    cube: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim: Option<Res<Simulation>>,
) {
    let ground_size = sim
        .as_ref()
        .map(|sim| sim.landscape().grid().world_size())
        .map_or(Vec2::splat(50.), |size| Vec2::new(size.x, size.z) * 4.);
    let center = sim
        .as_ref()
        .map(|sim| to_vec3(sim.landscape().grid().world_size()) * 0.5)
        .unwrap_or_default();

    // Ground
    commands.spawn((
        Transform::from_xyz(center.x, 0., center.z),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(ground_size.x, ground_size.y).build())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgb(0.2, 0.3, 0.25),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        })),
    ));

    commands.insert_resource(VoxelMeshAssets {
        cube: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
        material: materials.add(StandardMaterial {
            base_color: Color::srgb_u8(124, 144, 255),
            perceptual_roughness: 0.9,
            ..default()
        }),
    });

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(center.x + 10.0, 30.0, center.z - 10.0).looking_at(center, Vec3::Y),
    ));
}

/// Respawn one cuboid per merged box whenever the landscape publishes a new box list.
fn rebuild_box_meshes(
    mut commands: Commands,
    sim: Res<Simulation>,
    assets: Res<VoxelMeshAssets>,
    existing: Query<Entity, With<VoxelBoxMesh>>,
    mut shown_revision: Local<Option<u64>>,
) {
    let landscape = sim.landscape();
    if *shown_revision == Some(landscape.revision()) {
        return;
    }
    *shown_revision = Some(landscape.revision());

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let cell = landscape.grid().cell_size();
    for b in landscape.boxes() {
        commands.spawn((
            VoxelBoxMesh,
            Mesh3d(assets.cube.clone()),
            MeshMaterial3d(assets.material.clone()),
            Transform::from_translation(to_vec3(b.world_center(cell)))
                .with_scale(to_vec3(b.world_size(cell))),
        ));
    }
    debug!("showing {} voxel boxes", landscape.boxes().len());
}
