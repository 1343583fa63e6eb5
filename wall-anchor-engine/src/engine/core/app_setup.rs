use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::core::app_state::{AppState, LoadingProgress, transition_to_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::scene::AppStateStore;
use crate::engine::scene::object_manifest::{
    ObjectManifestLoader, SceneObjects, load_object_manifest_system, start_loading,
};
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::tools::anchor_placement::AnchorPlacementPlugin;
use crate::tools::markers::{MarkerVisualsPlugin, tick_feedback_effects};
use crate::tools::pointer::{InteractionSurface, pointer_to_point_input};
use crate::tools::tool_manager::{ToolManagerPlugin, handle_tool_keyboard_shortcuts};
use crate::tools::wall_calibration::WallCalibrationPlugin;

const SCENE_OBJECTS_PATH: &str = "scene.objects.json";

/// Back wall the pointer lands on during calibration.
const BACKDROP_SIZE: Vec2 = Vec2::new(6.0, 4.0);
const BACKDROP_Z: f32 = -2.05;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers SceneObjects as a loadable asset type from *.objects.json files.
        .add_plugins(JsonAssetPlugin::<SceneObjects>::new(&["objects.json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(ToolManagerPlugin)
        .add_plugins(AnchorPlacementPlugin)
        .add_plugins(WallCalibrationPlugin)
        .add_plugins(MarkerVisualsPlugin);

    app.init_resource::<LoadingProgress>()
        .init_resource::<AppStateStore>()
        .insert_resource(ObjectManifestLoader::new(SCENE_OBJECTS_PATH));

    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            (load_object_manifest_system, transition_to_running)
                .chain()
                .run_if(in_state(AppState::Loading)),
        );

    let runtime_systems = (
        handle_tool_keyboard_shortcuts, // Native shortcuts or no-op for WASM
        pointer_to_point_input,
        tick_feedback_effects,
    );

    app.add_systems(Update, runtime_systems.run_if(in_state(AppState::Running)));

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

fn spawn_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 1.5, 2.5).looking_at(Vec3::new(0.0, 1.3, -2.0), Vec3::Y),
    ));
}

fn spawn_backdrop(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    commands.spawn((
        InteractionSurface {
            size: BACKDROP_SIZE,
        },
        Mesh3d(meshes.add(Rectangle::new(BACKDROP_SIZE.x, BACKDROP_SIZE.y))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.35, 0.38),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::from_xyz(0.0, BACKDROP_SIZE.y * 0.5, BACKDROP_Z),
        Name::new("backdrop"),
    ));
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    spawn_lighting(&mut commands);
    spawn_camera(&mut commands);
    spawn_backdrop(&mut commands, &mut meshes, &mut materials);
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
