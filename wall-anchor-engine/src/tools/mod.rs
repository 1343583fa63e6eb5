//! Interactive placement tools.
//!
//! ## Tool Manager Architecture
//!
//! The `ToolManager` resource keeps one tool active at a time:
//! - Starting a workflow activates its tool
//! - Point input is routed only to the active tool
//! - Switching tools cancels the other workflow without touching saved state
//!
//! ```text
//! RPC / keyboard / pointer
//!   ├─> AnchorPlacementCommand ─> anchor_placement ─> AnchorStatusEvent
//!   ├─> WallCalibrationCommand ─> wall_calibration ─> WallCalibrationStatusEvent
//!   └─> PointInputEvent ────────> whichever tool is active
//! ```
//!
//! ## Available Tools
//!
//! ### Anchor Placement (`ToolType::AnchorPlacement`)
//! - **Activation**: `P` key (native) or `start_anchor_placement` RPC
//! - **Workflow**: point at the object face N times, or auto-place (`A`),
//!   then complete (`Enter`) to save; `Backspace` resets, digits set the count
//!
//! ### Wall Calibration (`ToolType::WallCalibration`)
//! - **Activation**: `C` key (native) or `start_wall_calibration` RPC
//! - **Workflow**: pick the top-left, top-right and bottom-right corners;
//!   the third point stores the wall and reports its size in centimetres

/// Anchor placement workflow: commands, state machine and default layouts.
pub mod anchor_placement;

/// Point input events, hand position resolution and input debouncing.
pub mod input;

/// Anchor markers and timed visual feedback effects.
pub mod markers;

/// Native mouse picking that produces point input.
pub mod pointer;

/// Exclusive tool activation and keyboard shortcuts.
pub mod tool_manager;

/// Three-point wall calibration and object projection onto the wall.
pub mod wall_calibration;
