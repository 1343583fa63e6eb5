use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::rpc::web_rpc::WebRpcInterface;
#[cfg(not(target_arch = "wasm32"))]
use crate::{
    engine::scene::MountableObject, tools::anchor_placement::AnchorPlacementCommand,
    tools::wall_calibration::WallCalibrationCommand,
};

/// Enumeration of available tools in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    WallCalibration,
    AnchorPlacement,
}

impl ToolType {
    /// Convert string identifier to tool type for RPC compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wall_calibration" | "calibration" => Some(Self::WallCalibration),
            "anchor_placement" | "anchors" => Some(Self::AnchorPlacement),
            _ => None,
        }
    }

    /// Tool identifier used in frontend notifications.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WallCalibration => "wall_calibration",
            Self::AnchorPlacement => "anchor_placement",
        }
    }
}

/// Resource tracking the single active tool. Point input is routed only to it.
#[derive(Resource, Default)]
pub struct ToolManager {
    active_tool: Option<ToolType>,
}

impl ToolManager {
    /// Activate specified tool, replacing any previous one. Returns `true` if the tool changed.
    pub fn activate_tool(&mut self, tool_type: ToolType) -> bool {
        if self.active_tool == Some(tool_type) {
            return false;
        }

        self.active_tool = Some(tool_type);
        info!("Tool manager activated: {}", tool_type.as_str());
        true
    }

    /// Deactivate currently active tool.
    pub fn deactivate_current_tool(&mut self) -> Option<ToolType> {
        let previous = self.active_tool.take();
        if let Some(tool) = previous {
            info!("Tool manager deactivated: {}", tool.as_str());
        }
        previous
    }

    /// Deactivate `tool_type` only if it is the active one.
    pub fn release(&mut self, tool_type: ToolType) {
        if self.is_tool_active(tool_type) {
            self.deactivate_current_tool();
        }
    }

    pub fn active_tool(&self) -> Option<ToolType> {
        self.active_tool
    }

    pub fn is_tool_active(&self, tool_type: ToolType) -> bool {
        self.active_tool == Some(tool_type)
    }
}

/// Event fired when tool selection changes via RPC or keyboard shortcuts.
#[derive(Event)]
pub struct ToolSelectionEvent {
    pub tool_type: ToolType,
    pub source: ToolSelectionSource,
}

/// Event fired to deactivate whatever tool is active.
#[derive(Event)]
pub struct ClearToolEvent {
    pub source: ToolSelectionSource,
}

/// Source of tool selection for debugging and conditional logic.
#[derive(Debug, Clone, Copy)]
pub enum ToolSelectionSource {
    Rpc,
    Keyboard,
}

pub struct ToolManagerPlugin;

impl Plugin for ToolManagerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToolManager>()
            .add_event::<ToolSelectionEvent>()
            .add_event::<ClearToolEvent>()
            .add_systems(
                Update,
                (
                    handle_tool_selection_events,
                    handle_clear_tool_events,
                    notify_tool_state_changes,
                )
                    .chain(),
            );
    }
}

/// System handling tool selection events.
pub fn handle_tool_selection_events(
    mut events: EventReader<ToolSelectionEvent>,
    mut tool_manager: ResMut<ToolManager>,
) {
    for event in events.read() {
        if tool_manager.activate_tool(event.tool_type) {
            info!("{} selected via {:?}", event.tool_type.as_str(), event.source);
        }
    }
}

/// System deactivating the current tool. Workflows observe the change and cancel themselves.
pub fn handle_clear_tool_events(
    mut events: EventReader<ClearToolEvent>,
    mut tool_manager: ResMut<ToolManager>,
) {
    for event in events.read() {
        if let Some(tool) = tool_manager.deactivate_current_tool() {
            info!("{} cleared via {:?}", tool.as_str(), event.source);
        }
    }
}

/// Tell the frontend whenever the active tool changes.
pub fn notify_tool_state_changes(
    tool_manager: Res<ToolManager>,
    mut last_reported: Local<Option<ToolType>>,
    rpc_interface: Option<ResMut<WebRpcInterface>>,
) {
    if !tool_manager.is_changed() || *last_reported == tool_manager.active_tool() {
        return;
    }
    *last_reported = tool_manager.active_tool();

    let Some(mut rpc_interface) = rpc_interface else {
        return;
    };
    rpc_interface.send_notification(
        "tool_state_changed",
        serde_json::json!({
            "tool": tool_manager.active_tool().map(|tool| tool.as_str()),
            "active": tool_manager.active_tool().is_some(),
        }),
    );
}

/// System handling keyboard shortcuts for the placement tools (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_tool_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    objects: Query<&MountableObject>,
    mut anchor_commands: EventWriter<AnchorPlacementCommand>,
    mut wall_commands: EventWriter<WallCalibrationCommand>,
    mut clear_events: EventWriter<ClearToolEvent>,
) {
    if keyboard.just_pressed(KeyCode::KeyC) {
        wall_commands.write(WallCalibrationCommand::Start);
    }

    if keyboard.just_pressed(KeyCode::KeyP) {
        // Start on the first object; selection of a specific one goes through RPC.
        if let Some(object) = objects.iter().next() {
            anchor_commands.write(AnchorPlacementCommand::Start {
                object_id: object.id.clone(),
            });
        } else {
            warn!("No mountable objects in scene");
        }
    }

    for (key, count) in [
        (KeyCode::Digit1, 1),
        (KeyCode::Digit2, 2),
        (KeyCode::Digit3, 3),
        (KeyCode::Digit4, 4),
    ] {
        if keyboard.just_pressed(key) {
            anchor_commands.write(AnchorPlacementCommand::SetCount { count });
        }
    }

    if keyboard.just_pressed(KeyCode::KeyA) {
        anchor_commands.write(AnchorPlacementCommand::AutoPlace);
    }
    if keyboard.just_pressed(KeyCode::Backspace) {
        anchor_commands.write(AnchorPlacementCommand::Reset);
        wall_commands.write(WallCalibrationCommand::Reset);
    }
    if keyboard.just_pressed(KeyCode::Enter) {
        anchor_commands.write(AnchorPlacementCommand::Complete);
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        clear_events.write(ClearToolEvent {
            source: ToolSelectionSource::Keyboard,
        });
    }
}

/// Placeholder system for WASM builds where keyboard shortcuts are disabled.
#[cfg(target_arch = "wasm32")]
pub fn handle_tool_keyboard_shortcuts() {
    // No keyboard shortcuts in WASM builds - tools controlled via RPC only.
}
