use bevy::prelude::*;
use serde::Serialize;

use crate::engine::scene::Anchor;

/// Workflow control messages raised by the UI layer.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum AnchorPlacementCommand {
    Start { object_id: String },
    SetCount { count: u8 },
    AutoPlace,
    Reset,
    Complete,
    Cancel,
}

/// Raised by the object picker once the user has chosen an object while selecting.
#[derive(Event, Debug, Clone)]
pub struct ObjectSelectedEvent {
    pub object_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorStatus {
    Started,
    InProgress,
    Reset,
    Preview,
    Completed,
    Error,
    Cancelled,
}

/// `anchor-status` notification.
#[derive(Event, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorStatusEvent {
    pub status: AnchorStatus,
    pub message: String,
    pub anchor_count: u8,
    pub placed_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// `anchor-completed` notification carrying the committed anchors.
#[derive(Event, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorCompletedEvent {
    pub object_id: String,
    pub anchors: Vec<Anchor>,
}
