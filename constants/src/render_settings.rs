use bevy::color::Color;

pub const ANCHOR_MARKER_RADIUS: f32 = 0.015;
pub const ANCHOR_MARKER_COLOUR: Color = Color::srgb(1.0, 0.27, 0.0);

pub const PLACEMENT_FLASH_RADIUS: f32 = 0.03;
pub const PLACEMENT_FLASH_SECS: f32 = 0.3;
pub const PLACEMENT_FLASH_COLOUR: Color = Color::srgb(1.0, 1.0, 0.2);

pub const CALIBRATION_POINT_RADIUS: f32 = 0.02;
pub const CALIBRATION_POINT_COLOUR: Color = Color::srgb(0.2, 0.8, 1.0);

pub const RING_PULSE_SECS: f32 = 0.6;
pub const RING_PULSE_MAX_SCALE: f32 = 2.5;

pub const OBJECT_FACE_COLOUR: Color = Color::srgba(0.85, 0.85, 0.9, 0.6);
