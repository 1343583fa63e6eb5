use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use serde_json::json;

use super::*;
use crate::engine::scene::{Anchor, AppStateStore, ObjectRepository, spawn_mountable_object};
use crate::tools::input::{Handedness, HandPositions, PointInputEvent};
use crate::tools::markers::AnchorMarker;
use crate::tools::tool_manager::{ToolManager, ToolType};

const EPS: f32 = 1e-4;
const FRAME: Duration = Duration::from_millis(100);

#[derive(Resource, Default)]
struct Captured {
    statuses: Vec<AnchorStatusEvent>,
    completed: Vec<AnchorCompletedEvent>,
}

fn capture(
    mut captured: ResMut<Captured>,
    mut statuses: EventReader<AnchorStatusEvent>,
    mut completed: EventReader<AnchorCompletedEvent>,
) {
    captured.statuses.extend(statuses.read().cloned());
    captured.completed.extend(completed.read().cloned());
}

fn saved_anchor() -> Anchor {
    Anchor {
        id: "anchor_saved_0".to_string(),
        object_id: "frame".to_string(),
        position: Vec3::new(0.0, 0.0, 0.01),
    }
}

/// Headless app with one 0.6 x 0.4 object at (0, 1.5, -2) that already has one saved anchor.
fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, TransformPlugin, AnchorPlacementPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .insert_resource(AppStateStore::from_value(json!({
            "objects": [
                {
                    "id": "frame",
                    "width": 0.6,
                    "height": 0.4,
                    "anchors": [{"id": "anchor_saved_0", "objectId": "frame", "position": [0.0, 0.0, 0.01]}]
                },
                {"id": "shelf", "width": 0.9, "height": 0.25, "anchors": []}
            ]
        })))
        .init_resource::<Captured>()
        .add_systems(PostUpdate, capture);

    let records = app.world().resource::<AppStateStore>().objects().unwrap();
    {
        let mut commands = app.world_mut().commands();
        spawn_mountable_object(&mut commands, &records[0], Transform::from_xyz(0.0, 1.5, -2.0));
        spawn_mountable_object(&mut commands, &records[1], Transform::from_xyz(1.2, 1.1, -2.0));
    }
    app.world_mut().flush();
    app.update();
    app
}

fn send_command(app: &mut App, command: AnchorPlacementCommand) {
    app.world_mut().send_event(command);
    app.update();
}

fn send_point(app: &mut App, world: Vec3) {
    app.world_mut().send_event(PointInputEvent::at(world));
    app.update();
}

/// Run enough frames for the next input to clear the 500 ms debounce window.
fn wait_past_debounce(app: &mut App) {
    for _ in 0..5 {
        app.update();
    }
}

fn state(app: &App) -> &AnchorPlacementState {
    app.world().resource::<AnchorPlacementState>()
}

fn saved_anchors(app: &App, id: &str) -> Vec<Anchor> {
    app.world().resource::<AppStateStore>().get(id).unwrap().anchors
}

fn marker_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&AnchorMarker>()
        .iter(app.world())
        .count()
}

fn last_status(app: &App) -> AnchorStatus {
    app.world()
        .resource::<Captured>()
        .statuses
        .last()
        .map(|event| event.status)
        .unwrap()
}

fn start_on_frame(app: &mut App) {
    send_command(
        app,
        AnchorPlacementCommand::Start {
            object_id: "frame".to_string(),
        },
    );
}

#[test]
fn start_on_known_object_goes_straight_to_placing() {
    let mut app = test_app();
    start_on_frame(&mut app);

    assert_eq!(state(&app).step, PlacementStep::Placing);
    assert_eq!(state(&app).current_object_id.as_deref(), Some("frame"));
    assert_eq!(last_status(&app), AnchorStatus::Started);
    assert!(
        app.world()
            .resource::<ToolManager>()
            .is_tool_active(ToolType::AnchorPlacement)
    );
}

#[test]
fn manual_placement_reaches_preview_and_stops_accepting() {
    let mut app = test_app();
    start_on_frame(&mut app);

    send_point(&mut app, Vec3::new(0.1, 1.6, -2.0));
    assert_eq!(state(&app).step, PlacementStep::Placing);
    assert_eq!(last_status(&app), AnchorStatus::InProgress);

    wait_past_debounce(&mut app);
    send_point(&mut app, Vec3::new(-0.1, 1.4, -2.0));
    assert_eq!(state(&app).step, PlacementStep::Preview);
    assert_eq!(last_status(&app), AnchorStatus::Preview);

    wait_past_debounce(&mut app);
    send_point(&mut app, Vec3::new(0.0, 1.5, -2.0));
    assert_eq!(state(&app).anchors.len(), 2);
    assert_eq!(marker_count(&mut app), 2);

    let first = &state(&app).anchors[0];
    assert!((first.position - Vec3::new(0.1, 0.1, 0.01)).length() < EPS);
    assert_ne!(state(&app).anchors[0].id, state(&app).anchors[1].id);
}

#[test]
fn inputs_inside_debounce_window_add_one_anchor() {
    let mut app = test_app();
    start_on_frame(&mut app);

    send_point(&mut app, Vec3::new(0.1, 1.6, -2.0));
    send_point(&mut app, Vec3::new(0.12, 1.6, -2.0));

    assert_eq!(state(&app).anchors.len(), 1);
}

#[test]
fn untracked_hand_does_not_consume_debounce_window() {
    let mut app = test_app();
    start_on_frame(&mut app);

    app.world_mut()
        .send_event(PointInputEvent::hand(Handedness::Right));
    app.update();
    assert!(state(&app).anchors.is_empty());

    app.world_mut().resource_mut::<HandPositions>().right = Some(Vec3::new(0.0, 1.6, -2.0));
    app.world_mut()
        .send_event(PointInputEvent::hand(Handedness::Right));
    app.update();
    assert_eq!(state(&app).anchors.len(), 1);
}

#[test]
fn rejected_input_for_missing_object_does_not_consume_debounce_window() {
    let mut app = test_app();
    start_on_frame(&mut app);
    let objects = app
        .world()
        .resource::<AppStateStore>()
        .get_state("objects")
        .cloned()
        .unwrap();

    app.world_mut()
        .resource_mut::<AppStateStore>()
        .update_state("objects", json!([]));
    send_point(&mut app, Vec3::new(0.1, 1.6, -2.0));
    assert!(state(&app).anchors.is_empty());
    assert_eq!(last_status(&app), AnchorStatus::Error);

    app.world_mut()
        .resource_mut::<AppStateStore>()
        .update_state("objects", objects);
    send_point(&mut app, Vec3::new(0.1, 1.6, -2.0));
    assert_eq!(state(&app).anchors.len(), 1);
}

#[test]
fn cancel_after_partial_placement_keeps_saved_anchors() {
    let mut app = test_app();
    let before = saved_anchors(&app, "frame");

    start_on_frame(&mut app);
    send_point(&mut app, Vec3::new(0.1, 1.6, -2.0));
    send_command(&mut app, AnchorPlacementCommand::Cancel);
    app.update();

    assert_eq!(saved_anchors(&app, "frame"), before);
    assert_eq!(before, vec![saved_anchor()]);
    assert_eq!(state(&app).step, PlacementStep::Idle);
    assert!(state(&app).anchors.is_empty());
    assert_eq!(marker_count(&mut app), 0);
    assert_eq!(last_status(&app), AnchorStatus::Cancelled);
    assert_eq!(app.world().resource::<ToolManager>().active_tool(), None);
}

#[test]
fn complete_with_count_mismatch_reports_error_and_saves_nothing() {
    let mut app = test_app();
    start_on_frame(&mut app);
    send_point(&mut app, Vec3::new(0.1, 1.6, -2.0));

    send_command(&mut app, AnchorPlacementCommand::Complete);

    assert_eq!(last_status(&app), AnchorStatus::Error);
    assert_eq!(saved_anchors(&app, "frame"), vec![saved_anchor()]);
    assert_eq!(state(&app).step, PlacementStep::Placing);
    assert_eq!(state(&app).anchors.len(), 1);
    assert!(app.world().resource::<Captured>().completed.is_empty());
}

#[test]
fn auto_place_then_complete_replaces_saved_anchors() {
    let mut app = test_app();
    start_on_frame(&mut app);

    send_command(&mut app, AnchorPlacementCommand::AutoPlace);
    assert_eq!(state(&app).step, PlacementStep::Preview);
    assert!(state(&app).auto_placed);
    let working = state(&app).anchors.clone();
    assert_eq!(working.len(), 2);
    assert!((working[0].position - Vec3::new(0.0, 0.1, 0.01)).length() < EPS);
    assert!((working[1].position - Vec3::new(0.0, -0.1, 0.01)).length() < EPS);

    send_command(&mut app, AnchorPlacementCommand::Complete);
    app.update();

    assert_eq!(saved_anchors(&app, "frame"), working);
    assert!(saved_anchors(&app, "shelf").is_empty());
    assert_eq!(last_status(&app), AnchorStatus::Completed);
    assert_eq!(state(&app).step, PlacementStep::Idle);
    assert_eq!(marker_count(&mut app), 0);

    let completed = &app.world().resource::<Captured>().completed;
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].object_id, "frame");
    assert_eq!(completed[0].anchors, working);
}

#[test]
fn set_count_after_auto_place_relayouts() {
    let mut app = test_app();
    start_on_frame(&mut app);
    send_command(&mut app, AnchorPlacementCommand::AutoPlace);

    send_command(&mut app, AnchorPlacementCommand::SetCount { count: 4 });
    app.update();

    assert_eq!(state(&app).anchor_count, 4);
    assert_eq!(state(&app).anchors.len(), 4);
    assert_eq!(state(&app).step, PlacementStep::Preview);
    assert_eq!(marker_count(&mut app), 4);
}

#[test]
fn set_count_out_of_range_is_rejected() {
    let mut app = test_app();
    start_on_frame(&mut app);

    send_command(&mut app, AnchorPlacementCommand::SetCount { count: 0 });
    assert_eq!(state(&app).anchor_count, 2);
    assert_eq!(last_status(&app), AnchorStatus::Error);

    send_command(&mut app, AnchorPlacementCommand::SetCount { count: 5 });
    assert_eq!(state(&app).anchor_count, 2);
    assert_eq!(state(&app).step, PlacementStep::Placing);
}

#[test]
fn failed_relayout_keeps_previous_count_and_anchors() {
    let mut app = test_app();
    start_on_frame(&mut app);
    send_command(&mut app, AnchorPlacementCommand::SetCount { count: 4 });
    send_command(&mut app, AnchorPlacementCommand::AutoPlace);
    assert_eq!(state(&app).anchors.len(), 4);

    app.world_mut()
        .resource_mut::<AppStateStore>()
        .update_state("objects", json!([]));
    send_command(&mut app, AnchorPlacementCommand::SetCount { count: 1 });

    assert_eq!(last_status(&app), AnchorStatus::Error);
    assert_eq!(state(&app).anchor_count, 4);
    assert_eq!(state(&app).anchors.len(), 4);
    assert_eq!(state(&app).step, PlacementStep::Preview);
    assert_eq!(marker_count(&mut app), 4);
}

#[test]
fn lowering_count_after_manual_placement_drops_latest() {
    let mut app = test_app();
    start_on_frame(&mut app);
    send_point(&mut app, Vec3::new(0.1, 1.6, -2.0));
    wait_past_debounce(&mut app);
    send_point(&mut app, Vec3::new(-0.1, 1.4, -2.0));
    let first_id = state(&app).anchors[0].id.clone();

    send_command(&mut app, AnchorPlacementCommand::SetCount { count: 1 });
    app.update();

    assert_eq!(state(&app).anchors.len(), 1);
    assert_eq!(state(&app).anchors[0].id, first_id);
    assert_eq!(state(&app).step, PlacementStep::Preview);
    assert_eq!(marker_count(&mut app), 1);

    send_command(&mut app, AnchorPlacementCommand::SetCount { count: 3 });
    assert_eq!(state(&app).step, PlacementStep::Placing);
}

#[test]
fn reset_keeps_object_and_count() {
    let mut app = test_app();
    start_on_frame(&mut app);
    send_command(&mut app, AnchorPlacementCommand::SetCount { count: 3 });
    send_command(&mut app, AnchorPlacementCommand::AutoPlace);

    send_command(&mut app, AnchorPlacementCommand::Reset);
    app.update();

    assert_eq!(state(&app).step, PlacementStep::Placing);
    assert_eq!(state(&app).current_object_id.as_deref(), Some("frame"));
    assert_eq!(state(&app).anchor_count, 3);
    assert!(state(&app).anchors.is_empty());
    assert_eq!(marker_count(&mut app), 0);
    assert_eq!(last_status(&app), AnchorStatus::Reset);
}

#[test]
fn unknown_object_waits_for_selection() {
    let mut app = test_app();
    send_command(
        &mut app,
        AnchorPlacementCommand::Start {
            object_id: "lamp".to_string(),
        },
    );
    assert_eq!(state(&app).step, PlacementStep::Selecting);
    assert_eq!(last_status(&app), AnchorStatus::InProgress);

    send_point(&mut app, Vec3::new(0.0, 1.5, -2.0));
    assert!(state(&app).anchors.is_empty());

    app.world_mut().send_event(ObjectSelectedEvent {
        object_id: "lamp".to_string(),
    });
    app.update();
    assert_eq!(state(&app).step, PlacementStep::Selecting);
    assert_eq!(last_status(&app), AnchorStatus::Error);

    app.world_mut().send_event(ObjectSelectedEvent {
        object_id: "shelf".to_string(),
    });
    app.update();
    assert_eq!(state(&app).step, PlacementStep::Placing);
    assert_eq!(state(&app).current_object_id.as_deref(), Some("shelf"));
}

#[test]
fn switching_tool_cancels_session() {
    let mut app = test_app();
    start_on_frame(&mut app);
    send_point(&mut app, Vec3::new(0.1, 1.6, -2.0));

    app.world_mut()
        .resource_mut::<ToolManager>()
        .activate_tool(ToolType::WallCalibration);
    app.update();

    assert_eq!(state(&app).step, PlacementStep::Idle);
    assert_eq!(last_status(&app), AnchorStatus::Cancelled);
    assert_eq!(saved_anchors(&app, "frame"), vec![saved_anchor()]);
}
