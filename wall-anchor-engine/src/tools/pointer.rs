use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::scene::{MountableObject, ObjectSize};
use crate::tools::input::PointInputEvent;

/// Flat surface the pointer can land on when no object face is hit (the room's back wall).
#[derive(Component, Debug, Clone, Copy)]
pub struct InteractionSurface {
    pub size: Vec2,
}

/// Distance along `ray` to the rectangle of `size` centred on `transform`, facing its local +Z.
fn hit_face(ray: Ray3d, transform: &GlobalTransform, size: Vec2) -> Option<f32> {
    let plane = InfinitePlane3d {
        normal: transform.back(),
    };
    let distance = ray.intersect_plane(transform.translation(), plane)?;

    let local = transform
        .affine()
        .inverse()
        .transform_point3(ray.get_point(distance));
    let half = size * 0.5;
    (local.x.abs() <= half.x && local.y.abs() <= half.y).then_some(distance)
}

/// Turn left clicks into point input on the nearest object face or interaction surface.
pub fn pointer_to_point_input(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera)>,
    objects: Query<(&GlobalTransform, &ObjectSize), With<MountableObject>>,
    surfaces: Query<(&GlobalTransform, &InteractionSurface)>,
    mut point_inputs: EventWriter<PointInputEvent>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Some(cursor_pos) = window.cursor_position() else { return };
    let Ok((cam_xform, camera)) = cameras.single() else { return };
    let Ok(ray) = camera.viewport_to_world(cam_xform, cursor_pos) else { return };

    // Object faces sit in front of the wall, so they win.
    let object_hit = objects
        .iter()
        .filter_map(|(transform, size)| hit_face(ray, transform, size.0))
        .min_by(f32::total_cmp);
    let hit = object_hit.or_else(|| {
        surfaces
            .iter()
            .filter_map(|(transform, surface)| hit_face(ray, transform, surface.size))
            .min_by(f32::total_cmp)
    });

    if let Some(distance) = hit {
        let position = ray.get_point(distance);
        debug!("Pointer hit at {:?}", position);
        point_inputs.write(PointInputEvent::at(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_face_inside_bounds_only() {
        let transform = GlobalTransform::from(Transform::from_xyz(0.0, 1.5, -2.0));
        let size = Vec2::new(0.6, 0.4);

        let inside = Ray3d::new(Vec3::new(0.1, 1.6, 0.0), Dir3::NEG_Z);
        let distance = hit_face(inside, &transform, size).unwrap();
        assert!((distance - 2.0).abs() < 1e-5);

        let outside = Ray3d::new(Vec3::new(0.5, 1.5, 0.0), Dir3::NEG_Z);
        assert!(hit_face(outside, &transform, size).is_none());
    }
}
