use bevy::prelude::*;

use super::object_repository::ObjectRecord;

/// Scene entity for an object that can carry anchors.
///
/// The entity's `GlobalTransform` defines the object's local frame: anchors
/// are stored relative to it and their markers are parented to it.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct MountableObject {
    pub id: String,
}

/// Face size of a mountable object in metres (width along local X, height along local Y).
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ObjectSize(pub Vec2);

impl ObjectSize {
    /// Corners of the object face in local space: top-left, top-right, bottom-right, bottom-left.
    pub fn local_corners(&self) -> [Vec3; 4] {
        let half = self.0 * 0.5;
        [
            Vec3::new(-half.x, half.y, 0.0),
            Vec3::new(half.x, half.y, 0.0),
            Vec3::new(half.x, -half.y, 0.0),
            Vec3::new(-half.x, -half.y, 0.0),
        ]
    }
}

/// Spawn the entity for `record` at `transform`.
pub fn spawn_mountable_object(
    commands: &mut Commands,
    record: &ObjectRecord,
    transform: Transform,
) -> Entity {
    commands
        .spawn((
            MountableObject {
                id: record.id.clone(),
            },
            ObjectSize(Vec2::new(record.width, record.height)),
            transform,
            Visibility::default(),
            Name::new(format!("object_{}", record.id)),
        ))
        .id()
}
