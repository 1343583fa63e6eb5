use bevy::prelude::*;
use constants::calibration::{CONTAINMENT_EPSILON, DEGENERATE_EPSILON};
use constants::coordinate_system::RECTANGLE_EULER_ORDER;

use super::error::{GeometryError, GeometryResult};

/// Size and placement of a rectangle measured from its corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleDimensions {
    pub width: f32,
    pub height: f32,
    pub center: Vec3,
    pub area: f32,
    /// Top-left, top-right, bottom-right, bottom-left.
    pub corners: [Vec3; 4],
}

/// Complete the parallelogram `p1, p2, p3` with its fourth corner `p1 + (p3 - p2)`.
///
/// Input order must be top-left, top-right, bottom-right; the result is the
/// bottom-left corner. Any other order yields a valid-looking but different point.
pub fn calculate_fourth_corner(p1: Vec3, p2: Vec3, p3: Vec3) -> Vec3 {
    p1 + (p3 - p2)
}

/// Width, height, centre and area of the rectangle described by 3 or 4 corners.
///
/// Width is `|p2 - p1|`, height is `|p3 - p2|`. With three corners the fourth
/// is inferred by [`calculate_fourth_corner`]. Returns `None` below three points.
pub fn calculate_rectangle_dimensions(points: &[Vec3]) -> Option<RectangleDimensions> {
    let (p1, p2, p3) = match points {
        [p1, p2, p3, ..] => (*p1, *p2, *p3),
        _ => return None,
    };
    let p4 = points
        .get(3)
        .copied()
        .unwrap_or_else(|| calculate_fourth_corner(p1, p2, p3));

    let width = p1.distance(p2);
    let height = p2.distance(p3);
    let center = (p1 + p2 + p3 + p4) / 4.0;

    Some(RectangleDimensions {
        width,
        height,
        center,
        area: width * height,
        corners: [p1, p2, p3, p4],
    })
}

/// Orientation of the rectangle `p1, p2, p3` as Euler angles in degrees (x, y, z).
///
/// Builds the basis right = `p2 - p1`, up = `p1 - p4`, forward = right x up and
/// decomposes it in Z-Y-X order. Up is re-orthogonalised against right so a
/// slightly skewed measurement still gives a proper rotation.
pub fn calculate_rectangle_orientation(p1: Vec3, p2: Vec3, p3: Vec3) -> GeometryResult<Vec3> {
    let p4 = calculate_fourth_corner(p1, p2, p3);

    let right = (p2 - p1).normalize_or_zero();
    let raw_up = p1 - p4;
    let up = (raw_up - right * raw_up.dot(right)).normalize_or_zero();

    if right == Vec3::ZERO || up == Vec3::ZERO {
        return Err(GeometryError::DegenerateGeometry(format!(
            "rectangle corners {p1:?}, {p2:?}, {p3:?} do not span a plane"
        )));
    }

    let forward = right.cross(up);
    if forward.length() < DEGENERATE_EPSILON {
        return Err(GeometryError::DegenerateGeometry(
            "rectangle edges are parallel".to_string(),
        ));
    }

    let basis = Mat3::from_cols(right, up, forward);
    let (z, y, x) = Quat::from_mat3(&basis).to_euler(RECTANGLE_EULER_ORDER);

    Ok(Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees()))
}

/// Inclusive containment test against four ordered corners.
///
/// Corners must form a simple polygon (top-left, top-right, bottom-right,
/// bottom-left). Any other corner count returns `false`. The point's distance
/// from the rectangle's plane is not considered.
pub fn point_in_rectangle(point: Vec3, rect_points: &[Vec3]) -> bool {
    let [a, b, _, d] = rect_points else {
        return false;
    };

    let ab = *b - *a;
    let ad = *d - *a;
    let ap = point - *a;

    let along_ab = ap.dot(ab);
    let along_ad = ap.dot(ad);

    let within = |value: f32, limit: f32| {
        let tolerance = CONTAINMENT_EPSILON * limit.max(1.0);
        value >= -tolerance && value <= limit + tolerance
    };

    within(along_ab, ab.length_squared()) && within(along_ad, ad.length_squared())
}
