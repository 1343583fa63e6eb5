/// Minimum interval between accepted point inputs during wall calibration (milliseconds)
pub const WALL_POINT_DEBOUNCE_MS: u64 = 1000;

/// Points needed to calibrate a wall: top-left, top-right, bottom-right
pub const WALL_CALIBRATION_POINTS: usize = 3;

/// Cross products shorter than this are treated as collinear input
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Tolerance used by inclusive containment tests
pub const CONTAINMENT_EPSILON: f32 = 1e-6;
