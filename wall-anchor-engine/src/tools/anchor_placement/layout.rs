use bevy::prelude::*;
use constants::placement::default_layout;

/// Map a normalized face position to object-local coordinates.
///
/// Normalized origin is the top-left corner with y pointing down; the local
/// frame is centred on the object with y up.
pub fn normalized_to_local(normalized: [f32; 2], size: Vec2, z_offset: f32) -> Vec3 {
    Vec3::new(
        (normalized[0] - 0.5) * size.x,
        (0.5 - normalized[1]) * size.y,
        z_offset,
    )
}

/// Default anchor positions for `count` anchors on an object of `size`.
pub fn default_local_positions(count: u8, size: Vec2, z_offset: f32) -> Option<Vec<Vec3>> {
    default_layout(count).map(|layout| {
        layout
            .iter()
            .map(|&normalized| normalized_to_local(normalized, size, z_offset))
            .collect()
    })
}

/// Convert a world position into the object's local frame, pinned to `z_offset`.
pub fn world_to_local(object_transform: &GlobalTransform, world: Vec3, z_offset: f32) -> Vec3 {
    let mut local = object_transform.affine().inverse().transform_point3(world);
    local.z = z_offset;
    local
}
