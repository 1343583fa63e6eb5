use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::geometry::to_vector3;
use crate::engine::scene::AppStateStore;
use crate::tools::anchor_placement::{
    AnchorCompletedEvent, AnchorPlacementCommand, AnchorStatusEvent, ObjectSelectedEvent,
};
use crate::tools::input::{Handedness, PointInputEvent};
use crate::tools::tool_manager::{
    ClearToolEvent, ToolSelectionEvent, ToolSelectionSource, ToolType,
};
use crate::tools::wall_calibration::{
    ObjectProjectedEvent, ProjectObjectEvent, WallCalibrationCommand, WallCalibrationStatusEvent,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, thiserror::Error)]
#[error("rpc error {code}: {message}")]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Outgoing message queues, flushed to the host window once per frame.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the host.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }
}

pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .init_resource::<AppStateStore>()
            .add_event::<IncomingRpcMessage>()
            .add_event::<AnchorPlacementCommand>()
            .add_event::<WallCalibrationCommand>()
            .add_event::<PointInputEvent>()
            .add_event::<ObjectSelectedEvent>()
            .add_event::<ProjectObjectEvent>()
            .add_event::<ToolSelectionEvent>()
            .add_event::<ClearToolEvent>()
            .add_event::<AnchorStatusEvent>()
            .add_event::<AnchorCompletedEvent>()
            .add_event::<WallCalibrationStatusEvent>()
            .add_event::<ObjectProjectedEvent>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    forward_workflow_notifications,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Ownership moves to JS; the listener lives as long as the page.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Messages received by the WASM listener, drained each frame.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Raw RPC message from the host.
#[derive(Event)]
pub struct IncomingRpcMessage {
    pub content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Event writers for everything an RPC request can trigger.
#[derive(SystemParam)]
pub struct WorkflowWriters<'w> {
    anchor_commands: EventWriter<'w, AnchorPlacementCommand>,
    wall_commands: EventWriter<'w, WallCalibrationCommand>,
    point_inputs: EventWriter<'w, PointInputEvent>,
    object_selections: EventWriter<'w, ObjectSelectedEvent>,
    projections: EventWriter<'w, ProjectObjectEvent>,
    tool_selections: EventWriter<'w, ToolSelectionEvent>,
    tool_clears: EventWriter<'w, ClearToolEvent>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    store: Res<AppStateStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut writers: WorkflowWriters,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("RPC request: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, &store, &mut writers) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Unparseable RPC message: {}", parse_error);
                rpc_interface.queue_response(RpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(RpcError {
                        code: -32600,
                        message: "Invalid request".to_string(),
                        data: Some(serde_json::json!({"reason": parse_error.to_string()})),
                    }),
                    id: None,
                });
            }
        }
    }
}

/// Dispatch one request. Returns a response only for requests carrying an id.
fn handle_rpc_request(
    request: &RpcRequest,
    store: &AppStateStore,
    writers: &mut WorkflowWriters,
) -> Option<RpcResponse> {
    let params = &request.params;

    let result = match request.method.as_str() {
        "start_anchor_placement" => parse_object_id(params).map(|object_id| {
            writers
                .anchor_commands
                .write(AnchorPlacementCommand::Start { object_id });
            accepted()
        }),
        "set_anchor_count" => parse_anchor_count(params).map(|count| {
            writers
                .anchor_commands
                .write(AnchorPlacementCommand::SetCount { count });
            accepted()
        }),
        "auto_place_anchors" => send_anchor_command(writers, AnchorPlacementCommand::AutoPlace),
        "reset_anchors" => send_anchor_command(writers, AnchorPlacementCommand::Reset),
        "complete_anchor_placement" => {
            send_anchor_command(writers, AnchorPlacementCommand::Complete)
        }
        "cancel_anchor_placement" => send_anchor_command(writers, AnchorPlacementCommand::Cancel),
        "select_object" => parse_object_id(params).map(|object_id| {
            writers
                .object_selections
                .write(ObjectSelectedEvent { object_id });
            accepted()
        }),
        "point_input" => parse_point_input(params).map(|input| {
            writers.point_inputs.write(input);
            accepted()
        }),
        "start_wall_calibration" => send_wall_command(writers, WallCalibrationCommand::Start),
        "reset_wall_calibration" => send_wall_command(writers, WallCalibrationCommand::Reset),
        "cancel_wall_calibration" => send_wall_command(writers, WallCalibrationCommand::Cancel),
        "project_object" => parse_object_id(params).map(|object_id| {
            writers.projections.write(ProjectObjectEvent { object_id });
            accepted()
        }),
        "tool_selection" => handle_tool_selection(params, writers),
        "clear_tool" => {
            writers.tool_clears.write(ClearToolEvent {
                source: ToolSelectionSource::Rpc,
            });
            Ok(accepted())
        }
        "get_state" => handle_get_state(params, store),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    // Notifications (no id) get no response.
    let id = request.id.clone()?;

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn accepted() -> serde_json::Value {
    serde_json::json!({ "success": true })
}

fn send_anchor_command(
    writers: &mut WorkflowWriters,
    command: AnchorPlacementCommand,
) -> Result<serde_json::Value, RpcError> {
    writers.anchor_commands.write(command);
    Ok(accepted())
}

fn send_wall_command(
    writers: &mut WorkflowWriters,
    command: WallCalibrationCommand,
) -> Result<serde_json::Value, RpcError> {
    writers.wall_commands.write(command);
    Ok(accepted())
}

fn parse_object_id(params: &serde_json::Value) -> Result<String, RpcError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ObjectParams {
        object_id: String,
    }

    serde_json::from_value::<ObjectParams>(params.clone())
        .map(|parsed| parsed.object_id)
        .map_err(|_| RpcError::invalid_params("Expected 'objectId' parameter"))
}

fn parse_anchor_count(params: &serde_json::Value) -> Result<u8, RpcError> {
    #[derive(Deserialize)]
    struct CountParams {
        count: u8,
    }

    // Range is checked by the workflow so the rejection shows up as a status.
    serde_json::from_value::<CountParams>(params.clone())
        .map(|parsed| parsed.count)
        .map_err(|_| RpcError::invalid_params("Expected numeric 'count' parameter"))
}

/// `{position: {x, y, z}}` or `{hand: "left" | "right"}`.
fn parse_point_input(params: &serde_json::Value) -> Result<PointInputEvent, RpcError> {
    if let Some(position) = params.get("position") {
        return Ok(PointInputEvent::at(to_vector3(position)));
    }
    if let Some(hand) = params.get("hand") {
        let hand = serde_json::from_value::<Handedness>(hand.clone())
            .map_err(|_| RpcError::invalid_params("'hand' must be 'left' or 'right'"))?;
        return Ok(PointInputEvent::hand(hand));
    }
    Err(RpcError::invalid_params(
        "Expected 'position' or 'hand' parameter",
    ))
}

fn handle_tool_selection(
    params: &serde_json::Value,
    writers: &mut WorkflowWriters,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ToolSelectionParams {
        tool: String,
    }

    let tool_params = serde_json::from_value::<ToolSelectionParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'tool' parameter"))?;

    let tool_type = ToolType::from_string(&tool_params.tool)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown tool: {}", tool_params.tool)))?;

    writers.tool_selections.write(ToolSelectionEvent {
        tool_type,
        source: ToolSelectionSource::Rpc,
    });

    Ok(serde_json::json!({
        "success": true,
        "active_tool": tool_type.as_str()
    }))
}

fn handle_get_state(
    params: &serde_json::Value,
    store: &AppStateStore,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct StateParams {
        path: String,
    }

    let state_params = serde_json::from_value::<StateParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'path' parameter"))?;

    Ok(serde_json::json!({
        "path": state_params.path,
        "value": store.get_state(&state_params.path).cloned(),
    }))
}

/// Turn workflow status events into notifications for the host.
fn forward_workflow_notifications(
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut anchor_status: EventReader<AnchorStatusEvent>,
    mut anchor_completed: EventReader<AnchorCompletedEvent>,
    mut wall_status: EventReader<WallCalibrationStatusEvent>,
    mut projected: EventReader<ObjectProjectedEvent>,
) {
    for event in anchor_status.read() {
        queue_event_notification(&mut rpc_interface, "anchor-status", event);
    }
    for event in anchor_completed.read() {
        queue_event_notification(&mut rpc_interface, "anchor-completed", event);
    }
    for event in wall_status.read() {
        queue_event_notification(&mut rpc_interface, "wall-calibration-status", event);
    }
    for event in projected.read() {
        queue_event_notification(&mut rpc_interface, "object-projected", event);
    }
}

fn queue_event_notification<T: Serialize>(
    rpc_interface: &mut WebRpcInterface,
    method: &str,
    event: &T,
) {
    match serde_json::to_value(event) {
        Ok(params) => rpc_interface.send_notification(method, params),
        Err(e) => error!("Failed to serialise {} notification: {}", method, e),
    }
}

/// Send queued notifications and responses to the host.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }
}
