//! Anchor placement workflow.
//!
//! Walks the user through placing 1-4 mounting anchors on one object:
//!
//! ```text
//! Idle --start--> Placing (object known) | Selecting --selected--> Placing
//! Placing --N anchors--> Preview --complete--> Idle
//!                          |  \--reset--> Placing
//!                          \--cancel--> Idle (saved anchors untouched)
//! ```
//!
//! Anchors are collected in working state and only written to the object
//! record, as one whole-list replace, on completion.

mod events;
mod layout;
mod state;
mod systems;

#[cfg(test)]
mod tests;

use bevy::prelude::*;

pub use events::{
    AnchorCompletedEvent, AnchorPlacementCommand, AnchorStatus, AnchorStatusEvent,
    ObjectSelectedEvent,
};
pub use layout::{default_local_positions, normalized_to_local, world_to_local};
pub use state::{
    AnchorPlacementConfig, AnchorPlacementState, ConfigError, PlacementStep, validate_anchor_count,
};
pub use systems::{
    cancel_when_tool_switched, handle_anchor_commands, handle_anchor_point_input,
    handle_object_selection,
};

use crate::engine::scene::AppStateStore;
use crate::tools::input::{HandPositions, PointInputEvent};
use crate::tools::tool_manager::ToolManager;

pub struct AnchorPlacementPlugin;

impl Plugin for AnchorPlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToolManager>()
            .init_resource::<AppStateStore>()
            .init_resource::<HandPositions>()
            .init_resource::<AnchorPlacementConfig>()
            .init_resource::<AnchorPlacementState>()
            .add_event::<AnchorPlacementCommand>()
            .add_event::<ObjectSelectedEvent>()
            .add_event::<PointInputEvent>()
            .add_event::<AnchorStatusEvent>()
            .add_event::<AnchorCompletedEvent>()
            .add_systems(
                Update,
                (
                    handle_anchor_commands,
                    handle_object_selection,
                    handle_anchor_point_input,
                    cancel_when_tool_switched,
                )
                    .chain(),
            );
    }
}
