use bevy::prelude::*;
use constants::calibration::DEGENERATE_EPSILON;
use constants::coordinate_system::REFERENCE_NORMAL;

use super::error::{GeometryError, GeometryResult};

/// Plane through `point` with unit `normal`.
///
/// `rotation` maps the reference normal (+Z) onto `normal`, so a flat quad
/// spawned with this rotation lies in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub rotation: Quat,
    pub point: Vec3,
}

impl Plane {
    /// Signed distance from `point` to the plane along the normal.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        (point - self.point).dot(self.normal)
    }
}

/// Build the plane through three points.
///
/// The normal is `normalize((p2 - p1) x (p3 - p1))`. Collinear or coincident
/// points have no defined normal and return `DegenerateGeometry`.
pub fn calculate_plane_from_points(p1: Vec3, p2: Vec3, p3: Vec3) -> GeometryResult<Plane> {
    let v1 = p2 - p1;
    let v2 = p3 - p1;
    let cross = v1.cross(v2);
    let length = cross.length();

    if !length.is_finite() || length < DEGENERATE_EPSILON {
        return Err(GeometryError::DegenerateGeometry(format!(
            "points {p1:?}, {p2:?}, {p3:?} are collinear"
        )));
    }

    let normal = cross / length;
    Ok(Plane {
        normal,
        rotation: Quat::from_rotation_arc(REFERENCE_NORMAL, normal),
        point: p1,
    })
}

/// Orthogonal projection of `point` onto `plane`.
pub fn project_point_onto_plane(point: Vec3, plane: &Plane) -> Vec3 {
    point - plane.normal * plane.signed_distance(point)
}
