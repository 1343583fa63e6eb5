use bevy::prelude::*;
use constants::render_settings::{
    ANCHOR_MARKER_COLOUR, ANCHOR_MARKER_RADIUS, CALIBRATION_POINT_COLOUR,
    CALIBRATION_POINT_RADIUS, OBJECT_FACE_COLOUR, PLACEMENT_FLASH_COLOUR,
    PLACEMENT_FLASH_RADIUS, PLACEMENT_FLASH_SECS, RING_PULSE_MAX_SCALE, RING_PULSE_SECS,
};

use crate::engine::scene::{MountableObject, ObjectSize};

/// Visual marker for a working anchor, parented to its object.
#[derive(Component, Debug, Clone)]
pub struct AnchorMarker {
    pub anchor_id: String,
}

/// Marker for a collected wall calibration point (world space).
#[derive(Component, Debug, Clone, Copy)]
pub struct CalibrationPointMarker {
    pub index: usize,
}

/// Short-lived confirmation flash at a freshly placed anchor.
#[derive(Component)]
pub struct PlacementFlash {
    pub timer: Timer,
}

/// Expanding ring shown when a calibration point is accepted.
#[derive(Component)]
pub struct RingPulse {
    pub timer: Timer,
}

/// Spawn an anchor marker as a child of `parent` at `local_position`.
pub fn spawn_anchor_marker(
    commands: &mut Commands,
    parent: Entity,
    local_position: Vec3,
    anchor_id: &str,
) -> Entity {
    commands
        .spawn((
            AnchorMarker {
                anchor_id: anchor_id.to_string(),
            },
            Transform::from_translation(local_position),
            Visibility::default(),
            ChildOf(parent),
            Name::new(format!("marker_{anchor_id}")),
        ))
        .id()
}

/// Spawn a placement flash under `parent`. It removes itself when its timer runs out.
pub fn spawn_placement_flash(commands: &mut Commands, parent: Entity, local_position: Vec3) {
    commands.spawn((
        PlacementFlash {
            timer: Timer::from_seconds(PLACEMENT_FLASH_SECS, TimerMode::Once),
        },
        Transform::from_translation(local_position),
        Visibility::default(),
        ChildOf(parent),
    ));
}

/// Spawn a calibration point marker with a ring pulse attached as its child.
pub fn spawn_calibration_point(commands: &mut Commands, position: Vec3, index: usize) -> Entity {
    let marker = commands
        .spawn((
            CalibrationPointMarker { index },
            Transform::from_translation(position),
            Visibility::default(),
            Name::new(format!("calibration_point_{index}")),
        ))
        .id();

    commands.spawn((
        RingPulse {
            timer: Timer::from_seconds(RING_PULSE_SECS, TimerMode::Once),
        },
        Transform::default(),
        Visibility::default(),
        ChildOf(marker),
    ));

    marker
}

/// Despawn a set of marker entities. Pending effects under them go with them.
pub fn despawn_markers(commands: &mut Commands, markers: impl IntoIterator<Item = Entity>) {
    for entity in markers {
        commands.entity(entity).try_despawn();
    }
}

/// Advance effect timers, grow ring pulses and remove finished effects.
pub fn tick_feedback_effects(
    mut commands: Commands,
    time: Res<Time>,
    mut flashes: Query<(Entity, &mut PlacementFlash)>,
    mut pulses: Query<(Entity, &mut RingPulse, &mut Transform)>,
) {
    for (entity, mut flash) in &mut flashes {
        if flash.timer.tick(time.delta()).finished() {
            commands.entity(entity).try_despawn();
        }
    }

    for (entity, mut pulse, mut transform) in &mut pulses {
        pulse.timer.tick(time.delta());
        if pulse.timer.finished() {
            commands.entity(entity).try_despawn();
        } else {
            let scale = 1.0 + (RING_PULSE_MAX_SCALE - 1.0) * pulse.timer.fraction();
            transform.scale = Vec3::splat(scale);
        }
    }
}

/// Shared mesh and material handles for marker visuals.
#[derive(Resource)]
struct MarkerAssets {
    anchor_mesh: Handle<Mesh>,
    anchor_material: Handle<StandardMaterial>,
    flash_mesh: Handle<Mesh>,
    flash_material: Handle<StandardMaterial>,
    point_mesh: Handle<Mesh>,
    point_material: Handle<StandardMaterial>,
    ring_mesh: Handle<Mesh>,
    face_material: Handle<StandardMaterial>,
}

/// Attaches meshes and materials to markers. Only added when rendering is present.
pub struct MarkerVisualsPlugin;

impl Plugin for MarkerVisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, create_marker_assets).add_systems(
            Update,
            (
                attach_anchor_marker_meshes,
                attach_flash_meshes,
                attach_calibration_meshes,
                attach_object_face_meshes,
            ),
        );
    }
}

fn create_marker_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(MarkerAssets {
        anchor_mesh: meshes.add(Sphere::new(ANCHOR_MARKER_RADIUS)),
        anchor_material: materials.add(StandardMaterial {
            base_color: ANCHOR_MARKER_COLOUR,
            unlit: true,
            ..default()
        }),
        flash_mesh: meshes.add(Sphere::new(PLACEMENT_FLASH_RADIUS)),
        flash_material: materials.add(StandardMaterial {
            base_color: PLACEMENT_FLASH_COLOUR,
            emissive: PLACEMENT_FLASH_COLOUR.to_linear() * 4.0,
            alpha_mode: AlphaMode::Blend,
            ..default()
        }),
        point_mesh: meshes.add(Sphere::new(CALIBRATION_POINT_RADIUS)),
        point_material: materials.add(StandardMaterial {
            base_color: CALIBRATION_POINT_COLOUR,
            unlit: true,
            ..default()
        }),
        ring_mesh: meshes.add(Torus::new(
            CALIBRATION_POINT_RADIUS * 1.2,
            CALIBRATION_POINT_RADIUS * 1.5,
        )),
        face_material: materials.add(StandardMaterial {
            base_color: OBJECT_FACE_COLOUR,
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            ..default()
        }),
    });
}

fn attach_anchor_marker_meshes(
    mut commands: Commands,
    assets: Option<Res<MarkerAssets>>,
    added: Query<Entity, Added<AnchorMarker>>,
) {
    let Some(assets) = assets else { return };
    for entity in &added {
        commands.entity(entity).try_insert((
            Mesh3d(assets.anchor_mesh.clone()),
            MeshMaterial3d(assets.anchor_material.clone()),
        ));
    }
}

fn attach_flash_meshes(
    mut commands: Commands,
    assets: Option<Res<MarkerAssets>>,
    added: Query<Entity, Added<PlacementFlash>>,
) {
    let Some(assets) = assets else { return };
    for entity in &added {
        commands.entity(entity).try_insert((
            Mesh3d(assets.flash_mesh.clone()),
            MeshMaterial3d(assets.flash_material.clone()),
        ));
    }
}

fn attach_calibration_meshes(
    mut commands: Commands,
    assets: Option<Res<MarkerAssets>>,
    points: Query<Entity, Added<CalibrationPointMarker>>,
    rings: Query<Entity, Added<RingPulse>>,
) {
    let Some(assets) = assets else { return };
    for entity in &points {
        commands.entity(entity).try_insert((
            Mesh3d(assets.point_mesh.clone()),
            MeshMaterial3d(assets.point_material.clone()),
        ));
    }
    for entity in &rings {
        commands.entity(entity).try_insert((
            Mesh3d(assets.ring_mesh.clone()),
            MeshMaterial3d(assets.point_material.clone()),
        ));
    }
}

// Objects are drawn as a flat quad in their local XY plane, facing +Z.
fn attach_object_face_meshes(
    mut commands: Commands,
    assets: Option<Res<MarkerAssets>>,
    mut meshes: ResMut<Assets<Mesh>>,
    added: Query<(Entity, &ObjectSize), Added<MountableObject>>,
) {
    let Some(assets) = assets else { return };
    for (entity, size) in &added {
        let mesh = meshes.add(Rectangle::new(size.0.x, size.0.y));
        commands.entity(entity).try_insert((
            Mesh3d(mesh),
            MeshMaterial3d(assets.face_material.clone()),
        ));
    }
}
