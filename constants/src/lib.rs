pub mod calibration;
pub mod coordinate_system;
pub mod placement;
pub mod render_settings;
