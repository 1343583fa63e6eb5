//! Wall calibration and object projection.
//!
//! The user picks three wall corners (top-left, top-right, bottom-right).
//! The third point completes the calibration: the wall plane, size and
//! orientation are stored under `wall` and kept as a [`WallSurface`]
//! resource that object projection measures against.

use std::time::Duration;

use bevy::prelude::*;
use constants::calibration::{WALL_CALIBRATION_POINTS, WALL_POINT_DEBOUNCE_MS};
use constants::coordinate_system::{RECTANGLE_EULER_ORDER, WALL_STATE_PATH};
use serde::{Deserialize, Serialize};

use crate::engine::geometry::{
    GeometryError, GeometryResult, Plane, RectangleDimensions, calculate_plane_from_points,
    calculate_rectangle_dimensions, calculate_rectangle_orientation, meters_to_formatted_cm,
    point_in_rectangle, project_point_onto_plane,
};
use crate::engine::scene::{AppStateStore, MountableObject, ObjectSize};
use crate::tools::anchor_placement::ConfigError;
use crate::tools::input::{HandPositions, InputDebouncer, PointInputEvent};
use crate::tools::markers::{despawn_markers, spawn_calibration_point};
use crate::tools::tool_manager::{ToolManager, ToolType};

const CORNER_NAMES: [&str; WALL_CALIBRATION_POINTS] = ["top-left", "top-right", "bottom-right"];

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallCalibrationCommand {
    Start,
    Reset,
    Cancel,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct WallCalibrationConfig {
    pub input_debounce: Duration,
}

impl WallCalibrationConfig {
    pub fn new(input_debounce: Duration) -> Result<Self, ConfigError> {
        if input_debounce.is_zero() {
            return Err(ConfigError::NonPositiveInterval);
        }
        Ok(Self { input_debounce })
    }
}

impl Default for WallCalibrationConfig {
    fn default() -> Self {
        Self {
            input_debounce: Duration::from_millis(WALL_POINT_DEBOUNCE_MS),
        }
    }
}

#[derive(Resource, Debug)]
pub struct WallCalibrationState {
    pub active: bool,
    pub points: Vec<Vec3>,
    pub point_markers: Vec<Entity>,
    pub debouncer: InputDebouncer,
}

impl WallCalibrationState {
    fn clear_points(&mut self) -> Vec<Entity> {
        self.points.clear();
        std::mem::take(&mut self.point_markers)
    }
}

impl FromWorld for WallCalibrationState {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource_or_init::<WallCalibrationConfig>();
        Self {
            active: false,
            points: Vec::new(),
            point_markers: Vec::new(),
            debouncer: InputDebouncer::new(config.input_debounce),
        }
    }
}

/// Calibrated wall rectangle.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WallSurface {
    pub plane: Plane,
    pub dimensions: RectangleDimensions,
    /// Euler angles in degrees (x, y, z), Z-Y-X order.
    pub rotation_degrees: Vec3,
}

impl WallSurface {
    /// Orientation of the wall rectangle: local X along the top edge, Y up.
    pub fn orientation(&self) -> Quat {
        let r = self.rotation_degrees;
        Quat::from_euler(
            RECTANGLE_EULER_ORDER,
            r.z.to_radians(),
            r.y.to_radians(),
            r.x.to_radians(),
        )
    }

    /// Whether `point`, projected onto the wall, falls inside its bounds.
    pub fn contains(&self, point: Vec3) -> bool {
        let projected = project_point_onto_plane(point, &self.plane);
        point_in_rectangle(projected, &self.dimensions.corners)
    }

    pub fn record(&self) -> WallRecord {
        WallRecord {
            position: self.dimensions.center,
            rotation: self.rotation_degrees,
            normal: self.plane.normal,
            width: self.dimensions.width,
            height: self.dimensions.height,
            corners: self.dimensions.corners,
        }
    }
}

/// Wall entry as persisted under the `wall` state path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallRecord {
    pub position: Vec3,
    pub rotation: Vec3,
    pub normal: Vec3,
    pub width: f32,
    pub height: f32,
    pub corners: [Vec3; 4],
}

/// Derive the wall surface from three ordered corners.
pub fn calibrate_wall(points: &[Vec3]) -> GeometryResult<WallSurface> {
    let &[p1, p2, p3] = points else {
        return Err(GeometryError::InsufficientPoints {
            required: WALL_CALIBRATION_POINTS,
            actual: points.len(),
        });
    };

    let plane = calculate_plane_from_points(p1, p2, p3)?;
    let rotation_degrees = calculate_rectangle_orientation(p1, p2, p3)?;
    let dimensions =
        calculate_rectangle_dimensions(points).ok_or(GeometryError::InsufficientPoints {
            required: WALL_CALIBRATION_POINTS,
            actual: points.len(),
        })?;

    Ok(WallSurface {
        plane,
        dimensions,
        rotation_degrees,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WallCalibrationStatus {
    Started,
    PointAdded,
    Completed,
    Reset,
    Error,
    Cancelled,
}

/// `wall-calibration-status` notification.
#[derive(Event, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WallCalibrationStatusEvent {
    pub status: WallCalibrationStatus,
    pub message: String,
    pub points_collected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_cm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<String>,
}

impl WallCalibrationStatusEvent {
    fn new(status: WallCalibrationStatus, message: impl Into<String>, points: usize) -> Self {
        Self {
            status,
            message: message.into(),
            points_collected: points,
            width_cm: None,
            height_cm: None,
        }
    }
}

/// Request to move an object onto the calibrated wall.
#[derive(Event, Debug, Clone)]
pub struct ProjectObjectEvent {
    pub object_id: String,
}

/// `object-projected` notification.
#[derive(Event, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProjectedEvent {
    pub object_id: String,
    pub projected: bool,
    pub fits: bool,
    pub message: String,
}

pub struct WallCalibrationPlugin;

impl Plugin for WallCalibrationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToolManager>()
            .init_resource::<AppStateStore>()
            .init_resource::<HandPositions>()
            .init_resource::<WallCalibrationConfig>()
            .init_resource::<WallCalibrationState>()
            .add_event::<WallCalibrationCommand>()
            .add_event::<PointInputEvent>()
            .add_event::<WallCalibrationStatusEvent>()
            .add_event::<ProjectObjectEvent>()
            .add_event::<ObjectProjectedEvent>()
            .add_systems(
                Update,
                (
                    handle_wall_commands,
                    handle_wall_point_input,
                    cancel_calibration_when_tool_switched,
                    project_objects_onto_wall,
                )
                    .chain(),
            );
    }
}

fn next_corner_message(collected: usize) -> String {
    match CORNER_NAMES.get(collected) {
        Some(corner) => format!("Select the {corner} corner of the wall"),
        None => "Calibrating wall".to_string(),
    }
}

pub fn handle_wall_commands(
    mut commands: Commands,
    mut events: EventReader<WallCalibrationCommand>,
    mut state: ResMut<WallCalibrationState>,
    mut tool_manager: ResMut<ToolManager>,
    mut status_events: EventWriter<WallCalibrationStatusEvent>,
) {
    for command in events.read() {
        match command {
            WallCalibrationCommand::Start => {
                let stale = state.clear_points();
                despawn_markers(&mut commands, stale);
                state.active = true;
                tool_manager.activate_tool(ToolType::WallCalibration);

                info!("Wall calibration started");
                status_events.write(WallCalibrationStatusEvent::new(
                    WallCalibrationStatus::Started,
                    next_corner_message(0),
                    0,
                ));
            }
            WallCalibrationCommand::Reset => {
                if !state.active {
                    continue;
                }
                let stale = state.clear_points();
                despawn_markers(&mut commands, stale);
                status_events.write(WallCalibrationStatusEvent::new(
                    WallCalibrationStatus::Reset,
                    next_corner_message(0),
                    0,
                ));
            }
            WallCalibrationCommand::Cancel => {
                if !state.active {
                    continue;
                }
                cancel_calibration(&mut commands, &mut state, &mut status_events);
                tool_manager.release(ToolType::WallCalibration);
            }
        }
    }
}

fn cancel_calibration(
    commands: &mut Commands,
    state: &mut WallCalibrationState,
    status_events: &mut EventWriter<WallCalibrationStatusEvent>,
) {
    let stale = state.clear_points();
    despawn_markers(commands, stale);
    state.active = false;

    info!("Wall calibration cancelled");
    status_events.write(WallCalibrationStatusEvent::new(
        WallCalibrationStatus::Cancelled,
        "Wall calibration cancelled",
        0,
    ));
}

pub fn handle_wall_point_input(
    mut commands: Commands,
    mut events: EventReader<PointInputEvent>,
    mut state: ResMut<WallCalibrationState>,
    mut store: ResMut<AppStateStore>,
    mut tool_manager: ResMut<ToolManager>,
    hands: Res<HandPositions>,
    time: Res<Time<Real>>,
    mut status_events: EventWriter<WallCalibrationStatusEvent>,
) {
    for event in events.read() {
        if !state.active || !tool_manager.is_tool_active(ToolType::WallCalibration) {
            continue;
        }
        let Some(position) = event.resolve(&hands) else {
            warn!("Point input from untracked source {:?}", event.source);
            continue;
        };
        if !state.debouncer.try_accept(time.elapsed()) {
            debug!("Calibration point debounced");
            continue;
        }

        let index = state.points.len();
        let marker = spawn_calibration_point(&mut commands, position, index);
        state.points.push(position);
        state.point_markers.push(marker);

        if state.points.len() < WALL_CALIBRATION_POINTS {
            status_events.write(WallCalibrationStatusEvent::new(
                WallCalibrationStatus::PointAdded,
                next_corner_message(state.points.len()),
                state.points.len(),
            ));
            continue;
        }

        let surface = match calibrate_wall(&state.points) {
            Ok(surface) => surface,
            Err(e) => {
                warn!("Wall calibration failed: {}", e);
                let stale = state.clear_points();
                despawn_markers(&mut commands, stale);
                status_events.write(WallCalibrationStatusEvent::new(
                    WallCalibrationStatus::Error,
                    format!("{e}. {}", next_corner_message(0)),
                    0,
                ));
                continue;
            }
        };

        if let Err(e) = store.set_typed(WALL_STATE_PATH, &surface.record()) {
            error!("Failed to save wall: {}", e);
            let stale = state.clear_points();
            despawn_markers(&mut commands, stale);
            status_events.write(WallCalibrationStatusEvent::new(
                WallCalibrationStatus::Error,
                e.to_string(),
                0,
            ));
            continue;
        }

        let width_cm = meters_to_formatted_cm(surface.dimensions.width, 1);
        let height_cm = meters_to_formatted_cm(surface.dimensions.height, 1);
        info!("✓ Wall calibrated: {} x {} cm", width_cm, height_cm);

        commands.insert_resource(surface);
        let stale = state.clear_points();
        despawn_markers(&mut commands, stale);
        state.active = false;
        tool_manager.release(ToolType::WallCalibration);

        status_events.write(WallCalibrationStatusEvent {
            status: WallCalibrationStatus::Completed,
            message: format!("Wall is {width_cm} x {height_cm} cm"),
            points_collected: WALL_CALIBRATION_POINTS,
            width_cm: Some(width_cm),
            height_cm: Some(height_cm),
        });
    }
}

pub fn cancel_calibration_when_tool_switched(
    mut commands: Commands,
    mut state: ResMut<WallCalibrationState>,
    tool_manager: Res<ToolManager>,
    mut status_events: EventWriter<WallCalibrationStatusEvent>,
) {
    if state.active && !tool_manager.is_tool_active(ToolType::WallCalibration) {
        cancel_calibration(&mut commands, &mut state, &mut status_events);
    }
}

/// Move requested objects onto the wall plane and report whether they fit.
pub fn project_objects_onto_wall(
    mut events: EventReader<ProjectObjectEvent>,
    wall: Option<Res<WallSurface>>,
    mut objects: Query<(&MountableObject, &ObjectSize, &mut Transform)>,
    mut projected_events: EventWriter<ObjectProjectedEvent>,
) {
    for event in events.read() {
        let Some(wall) = wall.as_deref() else {
            warn!("Projection of {} requested before wall calibration", event.object_id);
            projected_events.write(ObjectProjectedEvent {
                object_id: event.object_id.clone(),
                projected: false,
                fits: false,
                message: "Calibrate the wall first".to_string(),
            });
            continue;
        };

        let Some((_, size, mut transform)) = objects
            .iter_mut()
            .find(|(object, _, _)| object.id == event.object_id)
        else {
            warn!("No scene entity for object {}", event.object_id);
            projected_events.write(ObjectProjectedEvent {
                object_id: event.object_id.clone(),
                projected: false,
                fits: false,
                message: format!("Unknown object {}", event.object_id),
            });
            continue;
        };

        transform.translation = project_point_onto_plane(transform.translation, &wall.plane);
        transform.rotation = wall.orientation();

        let fits = size
            .local_corners()
            .iter()
            .all(|&corner| wall.contains(transform.transform_point(corner)));

        info!("Projected {} onto wall (fits: {})", event.object_id, fits);
        projected_events.write(ObjectProjectedEvent {
            object_id: event.object_id.clone(),
            projected: true,
            fits,
            message: if fits {
                "Object fits on the wall".to_string()
            } else {
                "Object extends past the wall edges".to_string()
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::{ObjectRecord, spawn_mountable_object};
    use bevy::time::TimeUpdateStrategy;

    const EPS: f32 = 1e-4;

    // 2 m x 2 m wall at z = -2 facing +Z.
    const TOP_LEFT: Vec3 = Vec3::new(-1.0, 2.0, -2.0);
    const TOP_RIGHT: Vec3 = Vec3::new(1.0, 2.0, -2.0);
    const BOTTOM_RIGHT: Vec3 = Vec3::new(1.0, 0.0, -2.0);

    #[derive(Resource, Default)]
    struct Captured {
        statuses: Vec<WallCalibrationStatusEvent>,
        projections: Vec<ObjectProjectedEvent>,
    }

    fn capture(
        mut captured: ResMut<Captured>,
        mut statuses: EventReader<WallCalibrationStatusEvent>,
        mut projections: EventReader<ObjectProjectedEvent>,
    ) {
        captured.statuses.extend(statuses.read().cloned());
        captured.projections.extend(projections.read().cloned());
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, WallCalibrationPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(500)))
            .init_resource::<Captured>()
            .add_systems(PostUpdate, capture);
        app.update();
        app
    }

    fn send_point(app: &mut App, position: Vec3) {
        app.world_mut().send_event(PointInputEvent::at(position));
        app.update();
        // Two 500 ms frames clear the 1000 ms window.
        app.update();
    }

    fn last_status(app: &App) -> WallCalibrationStatusEvent {
        app.world()
            .resource::<Captured>()
            .statuses
            .last()
            .cloned()
            .unwrap()
    }

    #[test]
    fn calibrate_wall_measures_rectangle() {
        let wall = calibrate_wall(&[TOP_LEFT, TOP_RIGHT, BOTTOM_RIGHT]).unwrap();
        assert!((wall.dimensions.width - 2.0).abs() < EPS);
        assert!((wall.dimensions.height - 2.0).abs() < EPS);
        assert!((wall.dimensions.center - Vec3::new(0.0, 1.0, -2.0)).length() < EPS);
        assert!(wall.rotation_degrees.length() < EPS);
        assert!(wall.contains(Vec3::new(0.5, 0.5, -1.0)));
        assert!(!wall.contains(Vec3::new(1.5, 0.5, -2.0)));
    }

    #[test]
    fn calibrate_wall_rejects_collinear_points() {
        let result = calibrate_wall(&[Vec3::ZERO, Vec3::X, Vec3::X * 2.0]);
        assert!(matches!(result, Err(GeometryError::DegenerateGeometry(_))));
        assert!(matches!(
            calibrate_wall(&[Vec3::ZERO, Vec3::X]),
            Err(GeometryError::InsufficientPoints { actual: 2, .. })
        ));
    }

    #[test]
    fn three_points_complete_calibration() {
        let mut app = test_app();
        app.world_mut().send_event(WallCalibrationCommand::Start);
        app.update();

        send_point(&mut app, TOP_LEFT);
        assert_eq!(last_status(&app).status, WallCalibrationStatus::PointAdded);
        send_point(&mut app, TOP_RIGHT);
        send_point(&mut app, BOTTOM_RIGHT);

        let status = last_status(&app);
        assert_eq!(status.status, WallCalibrationStatus::Completed);
        assert_eq!(status.width_cm.as_deref(), Some("200.0"));
        assert_eq!(status.height_cm.as_deref(), Some("200.0"));

        let record = app
            .world()
            .resource::<AppStateStore>()
            .get_typed::<WallRecord>(WALL_STATE_PATH)
            .unwrap()
            .unwrap();
        assert!((record.width - 2.0).abs() < EPS);
        assert!(app.world().get_resource::<WallSurface>().is_some());
        assert!(!app.world().resource::<WallCalibrationState>().active);
    }

    #[test]
    fn rapid_points_are_debounced() {
        let mut app = test_app();
        app.world_mut().send_event(WallCalibrationCommand::Start);
        app.update();

        app.world_mut().send_event(PointInputEvent::at(TOP_LEFT));
        app.update();
        app.world_mut().send_event(PointInputEvent::at(TOP_RIGHT));
        app.update();

        assert_eq!(app.world().resource::<WallCalibrationState>().points.len(), 1);
    }

    #[test]
    fn degenerate_points_report_error_and_restart() {
        let mut app = test_app();
        app.world_mut().send_event(WallCalibrationCommand::Start);
        app.update();

        send_point(&mut app, Vec3::ZERO);
        send_point(&mut app, Vec3::X);
        send_point(&mut app, Vec3::X * 2.0);

        assert_eq!(last_status(&app).status, WallCalibrationStatus::Error);
        let state = app.world().resource::<WallCalibrationState>();
        assert!(state.active);
        assert!(state.points.is_empty());
        assert!(
            app.world()
                .resource::<AppStateStore>()
                .get_state(WALL_STATE_PATH)
                .is_none()
        );
    }

    #[test]
    fn projection_reports_fit() {
        let mut app = test_app();
        let wall = calibrate_wall(&[TOP_LEFT, TOP_RIGHT, BOTTOM_RIGHT]).unwrap();
        app.insert_resource(wall);

        let frame = ObjectRecord {
            id: "frame".to_string(),
            width: 0.6,
            height: 0.4,
            anchors: Vec::new(),
        };
        let shelf = ObjectRecord {
            id: "shelf".to_string(),
            width: 0.9,
            height: 0.25,
            anchors: Vec::new(),
        };
        let frame_entity;
        {
            let mut commands = app.world_mut().commands();
            frame_entity =
                spawn_mountable_object(&mut commands, &frame, Transform::from_xyz(0.0, 1.5, -1.0));
            spawn_mountable_object(&mut commands, &shelf, Transform::from_xyz(1.2, 1.1, -1.0));
        }
        app.world_mut().flush();

        app.world_mut().send_event(ProjectObjectEvent {
            object_id: "frame".to_string(),
        });
        app.world_mut().send_event(ProjectObjectEvent {
            object_id: "shelf".to_string(),
        });
        app.update();

        let projections = &app.world().resource::<Captured>().projections;
        assert_eq!(projections.len(), 2);
        assert!(projections[0].projected && projections[0].fits);
        assert!(projections[1].projected && !projections[1].fits);

        let transform = app.world().get::<Transform>(frame_entity).unwrap();
        assert!((transform.translation - Vec3::new(0.0, 1.5, -2.0)).length() < EPS);
    }

    #[test]
    fn projection_without_wall_is_an_error() {
        let mut app = test_app();
        app.world_mut().send_event(ProjectObjectEvent {
            object_id: "frame".to_string(),
        });
        app.update();

        let projections = &app.world().resource::<Captured>().projections;
        assert_eq!(projections.len(), 1);
        assert!(!projections[0].projected);
    }
}
