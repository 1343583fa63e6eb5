use bevy::math::{EulerRot, Vec3};

/// Normal of an unrotated plane in the scene convention (facing +Z)
pub const REFERENCE_NORMAL: Vec3 = Vec3::Z;

/// Euler order used when handing rectangle orientations to the scene
pub const RECTANGLE_EULER_ORDER: EulerRot = EulerRot::ZYX;

/// State store key paths
pub const OBJECTS_STATE_PATH: &str = "objects";
pub const WALL_STATE_PATH: &str = "wall";
