//! JSON-RPC 2.0 bridge between the placement engine and the host UI.
//!
//! The host page embeds the engine in an iframe and talks to it with
//! `postMessage`. Requests become typed workflow events; workflow status
//! events flow back as notifications.
//!
//! ```text
//! Host UI (parent window)  <──postMessage──>  Engine (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Dispatch workflow event
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤  anchor-status, ...
//! ```
//!
//! ## Methods
//!
//! ### Anchor placement
//! - `start_anchor_placement { objectId }`
//! - `set_anchor_count { count }`
//! - `auto_place_anchors`, `reset_anchors`, `complete_anchor_placement`, `cancel_anchor_placement`
//! - `select_object { objectId }`: answers the selecting step
//!
//! ### Input
//! - `point_input { position: {x, y, z} }` or `point_input { hand: "left" | "right" }`
//!
//! ### Wall calibration
//! - `start_wall_calibration`, `reset_wall_calibration`, `cancel_wall_calibration`
//! - `project_object { objectId }`
//!
//! ### Tools and state
//! - `tool_selection { tool }`, `clear_tool`
//! - `get_state { path }`: read a key path from the state store
//!
//! ## Notifications
//!
//! `anchor-status`, `anchor-completed`, `wall-calibration-status`,
//! `object-projected` and `tool_state_changed`. Payload keys are camelCase.
//! Anchor positions in `anchor-completed` are `{x, y, z}` objects in the
//! object's local frame; wall and projection points are `[x, y, z]` arrays.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error

/// JSON-RPC 2.0 message types, dispatch and the WASM message listener.
pub mod web_rpc;
