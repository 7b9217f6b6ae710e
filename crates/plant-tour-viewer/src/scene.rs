//! Placeholder plant scenery.
//!
//! Primitive meshes stand in for the plant's buildings at the positions the
//! built-in tours frame. Optional groups hang off a [`SceneLayer`] root whose
//! visibility follows [`SceneLayers`].

use bevy::light::light_consts::lux;
use bevy::prelude::*;

use crate::launch_params::LaunchParams;

/// Plugin for the plant scenery.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneLayers>()
            .insert_resource(ClearColor(Color::srgb(0.62, 0.74, 0.86)))
            .add_systems(PreStartup, apply_launch_layers)
            .add_systems(Startup, spawn_plant)
            .add_systems(
                Update,
                sync_layer_visibility.run_if(resource_changed::<SceneLayers>),
            );
    }
}

/// Which optional scenery groups are shown.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SceneLayers {
    pub terrain: bool,
    pub switchyard: bool,
}

impl Default for SceneLayers {
    fn default() -> Self {
        Self {
            terrain: true,
            switchyard: true,
        }
    }
}

impl SceneLayers {
    /// Whether `layer` should currently be visible.
    pub fn shows(&self, layer: SceneLayer) -> bool {
        match layer {
            SceneLayer::Structures => true,
            SceneLayer::Terrain => self.terrain,
            SceneLayer::Switchyard => self.switchyard,
        }
    }
}

/// Root marker for a group of scenery entities.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneLayer {
    /// Buildings; always shown.
    Structures,
    /// Ground and river.
    Terrain,
    /// Transformers and pylons.
    Switchyard,
}

fn apply_launch_layers(params: Option<Res<LaunchParams>>, mut layers: ResMut<SceneLayers>) {
    if let Some(params) = params {
        layers.terrain = params.terrain;
        layers.switchyard = params.switchyard;
    }
}

fn layer_visibility(layers: &SceneLayers, layer: SceneLayer) -> Visibility {
    if layers.shows(layer) {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

fn sync_layer_visibility(
    layers: Res<SceneLayers>,
    mut roots: Query<(&SceneLayer, &mut Visibility)>,
) {
    for (layer, mut visibility) in &mut roots {
        *visibility = layer_visibility(&layers, *layer);
    }
}

/// Mesh handles and materials shared by the spawn helpers.
struct Palette {
    concrete: Handle<StandardMaterial>,
    dome: Handle<StandardMaterial>,
    cladding: Handle<StandardMaterial>,
    steel: Handle<StandardMaterial>,
    grass: Handle<StandardMaterial>,
    water: Handle<StandardMaterial>,
}

fn spawn_plant(
    mut commands: Commands,
    layers: Res<SceneLayers>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut material = |color: Color, roughness: f32| {
        materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: roughness,
            ..default()
        })
    };
    let palette = Palette {
        concrete: material(Color::srgb(0.78, 0.77, 0.74), 0.9),
        dome: material(Color::srgb(0.86, 0.86, 0.84), 0.6),
        cladding: material(Color::srgb(0.55, 0.62, 0.70), 0.7),
        steel: material(Color::srgb(0.45, 0.46, 0.48), 0.4),
        grass: material(Color::srgb(0.36, 0.52, 0.30), 1.0),
        water: material(Color::srgb(0.20, 0.38, 0.55), 0.2),
    };

    // Sun plus a weak fill from the opposite side.
    commands.spawn((
        DirectionalLight {
            illuminance: lux::AMBIENT_DAYLIGHT,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(80.0, 120.0, 60.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: lux::OVERCAST_DAY * 0.3,
            ..default()
        },
        Transform::from_xyz(-60.0, 40.0, -80.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    spawn_structures(&mut commands, &layers, &mut meshes, &palette);
    spawn_terrain(&mut commands, &layers, &mut meshes, &palette);
    spawn_switchyard(&mut commands, &layers, &mut meshes, &palette);

    tracing::info!("Plant scenery spawned");
}

fn layer_root(commands: &mut Commands, layers: &SceneLayers, layer: SceneLayer) -> Entity {
    commands
        .spawn((
            layer,
            Transform::default(),
            layer_visibility(layers, layer),
        ))
        .id()
}

fn spawn_part(
    commands: &mut Commands,
    parent: Entity,
    mesh: Handle<Mesh>,
    material: &Handle<StandardMaterial>,
    transform: Transform,
) {
    commands.spawn((
        Mesh3d(mesh),
        MeshMaterial3d(material.clone()),
        transform,
        ChildOf(parent),
    ));
}

fn spawn_structures(
    commands: &mut Commands,
    layers: &SceneLayers,
    meshes: &mut Assets<Mesh>,
    palette: &Palette,
) {
    let root = layer_root(commands, layers, SceneLayer::Structures);

    // Reactor building: cylinder with a hemispherical dome.
    spawn_part(
        commands,
        root,
        meshes.add(Cylinder::new(12.0, 30.0)),
        &palette.concrete,
        Transform::from_xyz(0.0, 15.0, 0.0),
    );
    spawn_part(
        commands,
        root,
        meshes.add(Sphere::new(12.0)),
        &palette.dome,
        Transform::from_xyz(0.0, 30.0, 0.0),
    );

    // Turbine hall running east of the reactor.
    spawn_part(
        commands,
        root,
        meshes.add(Cuboid::new(60.0, 18.0, 24.0)),
        &palette.cladding,
        Transform::from_xyz(65.0, 9.0, 0.0),
    );

    // Control building behind the reactor.
    spawn_part(
        commands,
        root,
        meshes.add(Cuboid::new(24.0, 16.0, 14.0)),
        &palette.concrete,
        Transform::from_xyz(0.0, 8.0, -28.0),
    );

    // Auxiliary and safety system blocks to the west.
    let auxiliary = meshes.add(Cuboid::new(18.0, 14.0, 16.0));
    for z in [-20.0, 20.0] {
        spawn_part(
            commands,
            root,
            auxiliary.clone(),
            &palette.concrete,
            Transform::from_xyz(-35.0, 7.0, z),
        );
    }

    // Stack beside the turbine hall.
    spawn_part(
        commands,
        root,
        meshes.add(Cylinder::new(2.5, 60.0)),
        &palette.steel,
        Transform::from_xyz(30.0, 30.0, -30.0),
    );
}

fn spawn_terrain(
    commands: &mut Commands,
    layers: &SceneLayers,
    meshes: &mut Assets<Mesh>,
    palette: &Palette,
) {
    let root = layer_root(commands, layers, SceneLayer::Terrain);

    spawn_part(
        commands,
        root,
        meshes.add(Plane3d::default().mesh().size(600.0, 600.0)),
        &palette.grass,
        Transform::default(),
    );
    // River along the intake side.
    spawn_part(
        commands,
        root,
        meshes.add(Plane3d::default().mesh().size(600.0, 80.0)),
        &palette.water,
        Transform::from_xyz(0.0, 0.05, -110.0),
    );
}

fn spawn_switchyard(
    commands: &mut Commands,
    layers: &SceneLayers,
    meshes: &mut Assets<Mesh>,
    palette: &Palette,
) {
    let root = layer_root(commands, layers, SceneLayer::Switchyard);

    let transformer = meshes.add(Cuboid::new(5.0, 4.0, 3.0));
    let pylon = meshes.add(Cylinder::new(0.4, 18.0));
    for i in 0..4u8 {
        let x = 58.0 + f32::from(i) * 8.0;
        spawn_part(
            commands,
            root,
            transformer.clone(),
            &palette.steel,
            Transform::from_xyz(x, 2.0, 55.0),
        );
        spawn_part(
            commands,
            root,
            pylon.clone(),
            &palette.steel,
            Transform::from_xyz(x, 9.0, 66.0),
        );
    }
}
