//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration and the loading
//! transition for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with scene loading, placement tools, marker
/// visuals, the RPC bridge and platform-specific input.
pub mod app_setup;

/// Application state machine from scene loading to runtime.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
pub mod window_config;
