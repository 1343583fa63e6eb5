use std::time::Duration;

use bevy::prelude::*;

use super::events::{
    AnchorCompletedEvent, AnchorPlacementCommand, AnchorStatus, AnchorStatusEvent,
    ObjectSelectedEvent,
};
use super::layout::{default_local_positions, world_to_local};
use super::state::{AnchorPlacementConfig, AnchorPlacementState, PlacementStep, validate_anchor_count};
use crate::engine::scene::{
    Anchor, AppStateStore, MountableObject, ObjectRecord, ObjectRepository, ObjectSize,
};
use crate::tools::input::{HandPositions, PointInputEvent};
use crate::tools::markers::{despawn_markers, spawn_anchor_marker, spawn_placement_flash};
use crate::tools::tool_manager::{ToolManager, ToolType};

pub type MountableQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static MountableObject,
        &'static ObjectSize,
        &'static GlobalTransform,
    ),
>;

/// Resolved placement target: the persisted record plus its scene entity.
struct PlacementTarget {
    record: ObjectRecord,
    entity: Entity,
    transform: GlobalTransform,
}

fn resolve_target(
    store: &AppStateStore,
    objects: &MountableQuery,
    object_id: &str,
) -> Result<PlacementTarget, String> {
    let record = store.get(object_id).map_err(|e| e.to_string())?;
    let (entity, _, _, transform) = objects
        .iter()
        .find(|(_, object, _, _)| object.id == object_id)
        .ok_or_else(|| format!("no scene entity for object {object_id}"))?;

    Ok(PlacementTarget {
        record,
        entity,
        transform: *transform,
    })
}

fn status_event(
    state: &AnchorPlacementState,
    status: AnchorStatus,
    message: impl Into<String>,
) -> AnchorStatusEvent {
    AnchorStatusEvent {
        status,
        message: message.into(),
        anchor_count: state.anchor_count,
        placed_count: state.placed_count(),
        object_id: state.current_object_id.clone(),
    }
}

fn remaining_message(state: &AnchorPlacementState) -> String {
    let remaining = (state.anchor_count as usize).saturating_sub(state.placed_count());
    match remaining {
        0 => "All anchors placed, confirm to save".to_string(),
        1 => "Place 1 more anchor".to_string(),
        n => format!("Place {n} more anchors"),
    }
}

fn anchor_id(now: Duration, index: usize) -> String {
    format!("anchor_{}_{}", now.as_millis(), index)
}

/// Append one anchor at `local_position` with its marker and a confirmation flash.
fn add_anchor(
    commands: &mut Commands,
    state: &mut AnchorPlacementState,
    target: &PlacementTarget,
    local_position: Vec3,
    now: Duration,
) {
    let anchor = Anchor {
        id: anchor_id(now, state.placed_count()),
        object_id: target.record.id.clone(),
        position: local_position,
    };
    let marker = spawn_anchor_marker(commands, target.entity, local_position, &anchor.id);
    spawn_placement_flash(commands, target.entity, local_position);

    debug!("Anchor {} at local {:?}", anchor.id, local_position);
    state.push_anchor(anchor, marker);
}

/// Replace the working anchors with the default layout for the current count.
fn auto_place(
    commands: &mut Commands,
    state: &mut AnchorPlacementState,
    config: &AnchorPlacementConfig,
    target: &PlacementTarget,
    now: Duration,
) -> Result<(), String> {
    let size = Vec2::new(target.record.width, target.record.height);
    let positions = default_local_positions(state.anchor_count, size, config.anchor_z_offset)
        .ok_or_else(|| format!("no default layout for {} anchors", state.anchor_count))?;

    let stale = state.clear_working();
    despawn_markers(commands, stale);

    for position in positions {
        add_anchor(commands, state, target, position, now);
    }
    state.step = PlacementStep::Preview;
    state.auto_placed = true;
    Ok(())
}

/// Process workflow control commands.
pub fn handle_anchor_commands(
    mut commands: Commands,
    mut events: EventReader<AnchorPlacementCommand>,
    mut state: ResMut<AnchorPlacementState>,
    config: Res<AnchorPlacementConfig>,
    mut store: ResMut<AppStateStore>,
    mut tool_manager: ResMut<ToolManager>,
    objects: MountableQuery,
    time: Res<Time<Real>>,
    mut status_events: EventWriter<AnchorStatusEvent>,
    mut completed_events: EventWriter<AnchorCompletedEvent>,
) {
    for command in events.read() {
        match command {
            AnchorPlacementCommand::Start { object_id } => {
                let stale = state.reset_to_idle();
                despawn_markers(&mut commands, stale);
                tool_manager.activate_tool(ToolType::AnchorPlacement);

                match resolve_target(&store, &objects, object_id) {
                    Ok(target) => {
                        state.current_object_id = Some(target.record.id.clone());
                        state.step = PlacementStep::Placing;
                        info!(
                            "Anchor placement started on {} ({} anchors)",
                            target.record.id, state.anchor_count
                        );
                        let message = remaining_message(&state);
                        status_events.write(status_event(&state, AnchorStatus::Started, message));
                    }
                    Err(reason) => {
                        warn!("Cannot start on {}: {}", object_id, reason);
                        state.step = PlacementStep::Selecting;
                        status_events.write(status_event(
                            &state,
                            AnchorStatus::InProgress,
                            "Select an object to place anchors on",
                        ));
                    }
                }
            }

            AnchorPlacementCommand::SetCount { count } => {
                if let Err(e) = validate_anchor_count(*count) {
                    warn!("Rejected anchor count: {}", e);
                    status_events.write(status_event(&state, AnchorStatus::Error, e.to_string()));
                    continue;
                }
                let previous_count = state.anchor_count;
                state.anchor_count = *count;

                if state.step == PlacementStep::Preview && state.auto_placed {
                    let target = state
                        .current_object_id
                        .clone()
                        .ok_or_else(|| "no object selected".to_string())
                        .and_then(|id| resolve_target(&store, &objects, &id));
                    let result = target.and_then(|target| {
                        auto_place(&mut commands, &mut state, &config, &target, time.elapsed())
                    });
                    match result {
                        Ok(()) => {
                            status_events.write(status_event(
                                &state,
                                AnchorStatus::Preview,
                                remaining_message(&state),
                            ));
                        }
                        Err(reason) => {
                            // Layout is untouched on failure, so the old count still matches it.
                            state.anchor_count = previous_count;
                            warn!("Auto-placement failed: {}", reason);
                            status_events.write(status_event(&state, AnchorStatus::Error, reason));
                        }
                    }
                    continue;
                }

                if matches!(state.step, PlacementStep::Placing | PlacementStep::Preview) {
                    let dropped = state.truncate_to_count();
                    despawn_markers(&mut commands, dropped);
                    state.step = if state.is_full() && state.placed_count() > 0 {
                        PlacementStep::Preview
                    } else {
                        PlacementStep::Placing
                    };
                }
                info!("Anchor count set to {}", count);
                let status = if state.step == PlacementStep::Preview {
                    AnchorStatus::Preview
                } else {
                    AnchorStatus::InProgress
                };
                let message = remaining_message(&state);
                status_events.write(status_event(&state, status, message));
            }

            AnchorPlacementCommand::AutoPlace => {
                if !matches!(state.step, PlacementStep::Placing | PlacementStep::Preview) {
                    warn!("Auto-placement ignored in {:?} step", state.step);
                    status_events.write(status_event(
                        &state,
                        AnchorStatus::Error,
                        "Start anchor placement on an object first",
                    ));
                    continue;
                }
                let target = state
                    .current_object_id
                    .clone()
                    .ok_or_else(|| "no object selected".to_string())
                    .and_then(|id| resolve_target(&store, &objects, &id));
                let result = target.and_then(|target| {
                    auto_place(&mut commands, &mut state, &config, &target, time.elapsed())
                });
                match result {
                    Ok(()) => {
                        info!("Auto-placed {} anchors", state.placed_count());
                        status_events.write(status_event(
                            &state,
                            AnchorStatus::Preview,
                            remaining_message(&state),
                        ));
                    }
                    Err(reason) => {
                        warn!("Auto-placement failed: {}", reason);
                        status_events.write(status_event(&state, AnchorStatus::Error, reason));
                    }
                }
            }

            AnchorPlacementCommand::Reset => {
                if !matches!(state.step, PlacementStep::Placing | PlacementStep::Preview) {
                    debug!("Reset ignored in {:?} step", state.step);
                    continue;
                }
                let stale = state.clear_working();
                despawn_markers(&mut commands, stale);
                state.step = PlacementStep::Placing;
                info!("Working anchors reset");
                let message = remaining_message(&state);
                status_events.write(status_event(&state, AnchorStatus::Reset, message));
            }

            AnchorPlacementCommand::Complete => {
                let placed = state.placed_count();
                let Some(object_id) = state.current_object_id.clone() else {
                    warn!("Complete requested with no active object");
                    status_events.write(status_event(
                        &state,
                        AnchorStatus::Error,
                        "No anchor placement in progress",
                    ));
                    continue;
                };
                if placed == 0 || placed != state.anchor_count as usize {
                    warn!("Cannot complete: {} of {} anchors placed", placed, state.anchor_count);
                    let message = format!(
                        "Place exactly {} anchors before completing ({} placed)",
                        state.anchor_count, placed
                    );
                    status_events.write(status_event(&state, AnchorStatus::Error, message));
                    continue;
                }

                let anchors = state.anchors.clone();
                if let Err(e) = store.replace_anchors(&object_id, anchors.clone()) {
                    error!("Failed to save anchors for {}: {}", object_id, e);
                    status_events.write(status_event(&state, AnchorStatus::Error, e.to_string()));
                    continue;
                }

                info!("✓ {} anchors saved on {}", anchors.len(), object_id);
                status_events.write(status_event(
                    &state,
                    AnchorStatus::Completed,
                    format!("{} anchors saved", anchors.len()),
                ));
                completed_events.write(AnchorCompletedEvent { object_id, anchors });

                let stale = state.reset_to_idle();
                despawn_markers(&mut commands, stale);
                tool_manager.release(ToolType::AnchorPlacement);
            }

            AnchorPlacementCommand::Cancel => {
                if state.step == PlacementStep::Idle {
                    debug!("Cancel ignored, no placement in progress");
                    continue;
                }
                cancel_session(&mut commands, &mut state, &mut status_events);
                tool_manager.release(ToolType::AnchorPlacement);
            }
        }
    }
}

fn cancel_session(
    commands: &mut Commands,
    state: &mut AnchorPlacementState,
    status_events: &mut EventWriter<AnchorStatusEvent>,
) {
    let object_id = state.current_object_id.clone();
    let stale = state.reset_to_idle();
    despawn_markers(commands, stale);

    info!("Anchor placement cancelled");
    status_events.write(AnchorStatusEvent {
        status: AnchorStatus::Cancelled,
        message: "Anchor placement cancelled".to_string(),
        anchor_count: state.anchor_count,
        placed_count: 0,
        object_id,
    });
}

/// Leave the selecting step once the user has picked an object.
pub fn handle_object_selection(
    mut events: EventReader<ObjectSelectedEvent>,
    mut state: ResMut<AnchorPlacementState>,
    store: Res<AppStateStore>,
    objects: MountableQuery,
    mut status_events: EventWriter<AnchorStatusEvent>,
) {
    for event in events.read() {
        if state.step != PlacementStep::Selecting {
            debug!("Selection of {} ignored in {:?} step", event.object_id, state.step);
            continue;
        }

        match resolve_target(&store, &objects, &event.object_id) {
            Ok(target) => {
                state.current_object_id = Some(target.record.id);
                state.step = PlacementStep::Placing;
                let message = remaining_message(&state);
                status_events.write(status_event(&state, AnchorStatus::Started, message));
            }
            Err(reason) => {
                warn!("Selected object unavailable: {}", reason);
                status_events.write(status_event(&state, AnchorStatus::Error, reason));
            }
        }
    }
}

/// Manual placement from pinch/select input.
pub fn handle_anchor_point_input(
    mut commands: Commands,
    mut events: EventReader<PointInputEvent>,
    mut state: ResMut<AnchorPlacementState>,
    config: Res<AnchorPlacementConfig>,
    store: Res<AppStateStore>,
    tool_manager: Res<ToolManager>,
    hands: Res<HandPositions>,
    objects: MountableQuery,
    time: Res<Time<Real>>,
    mut status_events: EventWriter<AnchorStatusEvent>,
) {
    for event in events.read() {
        if !tool_manager.is_tool_active(ToolType::AnchorPlacement) {
            continue;
        }
        if state.step != PlacementStep::Placing {
            debug!("Point input ignored in {:?} step", state.step);
            continue;
        }
        let Some(world_position) = event.resolve(&hands) else {
            warn!("Point input from untracked source {:?}", event.source);
            continue;
        };

        let Some(object_id) = state.current_object_id.clone() else {
            warn!("Point input with no target object");
            continue;
        };
        let target = match resolve_target(&store, &objects, &object_id) {
            Ok(target) => target,
            Err(reason) => {
                warn!("Anchor not added: {}", reason);
                status_events.write(status_event(&state, AnchorStatus::Error, reason));
                continue;
            }
        };

        let now = time.elapsed();
        if !state.debouncer.try_accept(now) {
            debug!("Point input debounced");
            continue;
        }

        let local = world_to_local(&target.transform, world_position, config.anchor_z_offset);
        add_anchor(&mut commands, &mut state, &target, local, now);
        state.auto_placed = false;

        let status = if state.step == PlacementStep::Preview {
            AnchorStatus::Preview
        } else {
            AnchorStatus::InProgress
        };
        let message = remaining_message(&state);
        status_events.write(status_event(&state, status, message));
    }
}

/// Cancel the session when another tool takes over.
pub fn cancel_when_tool_switched(
    mut commands: Commands,
    mut state: ResMut<AnchorPlacementState>,
    tool_manager: Res<ToolManager>,
    mut status_events: EventWriter<AnchorStatusEvent>,
) {
    if state.step != PlacementStep::Idle && !tool_manager.is_tool_active(ToolType::AnchorPlacement)
    {
        cancel_session(&mut commands, &mut state, &mut status_events);
    }
}
