//! Stateless 3D math for wall calibration and anchor placement.
//!
//! Every function here is pure: inputs are `Vec3` values (copied, never
//! aliased) and outputs are fresh values. The calibration and placement
//! workflows call into this module; nothing in it touches the ECS.
//!
//! ## Point order contract
//!
//! Rectangle helpers expect corners in the order
//! top-left, top-right, bottom-right (and bottom-left when four are given).
//! Supplying another order still produces a numerically valid result, but it
//! describes a different rectangle.

/// Error types for degenerate or insufficient geometric input.
pub mod error;

/// Plane construction from three points and point-to-plane projection.
pub mod plane;

/// Fourth-corner inference, rectangle dimensions, orientation and containment.
pub mod rectangle;

/// Metre to centimetre formatting for measurement display.
pub mod units;

/// Conversion of loosely shaped `{x, y, z}` payloads into `Vec3`.
pub mod vector;

pub use error::{GeometryError, GeometryResult};
pub use plane::{Plane, calculate_plane_from_points, project_point_onto_plane};
pub use rectangle::{
    RectangleDimensions, calculate_fourth_corner, calculate_rectangle_dimensions,
    calculate_rectangle_orientation, point_in_rectangle,
};
pub use units::meters_to_formatted_cm;
pub use vector::{to_vector3, xyz};
