use bevy::prelude::*;
use serde::Deserialize;

use super::mountable::spawn_mountable_object;
use super::object_repository::ObjectRecord;
use super::state_store::AppStateStore;
use crate::engine::core::app_state::LoadingProgress;

/// Scene file listing the objects available for placement.
#[derive(Asset, TypePath, Debug, Clone, Deserialize)]
pub struct SceneObjects {
    pub objects: Vec<SceneObjectEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneObjectEntry {
    #[serde(flatten)]
    pub record: ObjectRecord,
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles in degrees, X-Y-Z.
    #[serde(default)]
    pub rotation: Vec3,
}

impl SceneObjectEntry {
    pub fn transform(&self) -> Transform {
        let r = self.rotation;
        Transform::from_translation(self.position).with_rotation(Quat::from_euler(
            EulerRot::XYZ,
            r.x.to_radians(),
            r.y.to_radians(),
            r.z.to_radians(),
        ))
    }
}

#[derive(Resource)]
pub struct ObjectManifestLoader {
    pub path: String,
    handle: Option<Handle<SceneObjects>>,
}

impl ObjectManifestLoader {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            handle: None,
        }
    }
}

// Start loading the scene file
pub fn start_loading(mut loader: ResMut<ObjectManifestLoader>, asset_server: Res<AssetServer>) {
    info!("Loading scene objects from: {}", loader.path);
    let handle = asset_server.load(loader.path.clone());
    loader.handle = Some(handle);
}

// Seed the state store and spawn object entities once the file is available
pub fn load_object_manifest_system(
    mut commands: Commands,
    loader: Res<ObjectManifestLoader>,
    manifests: Res<Assets<SceneObjects>>,
    mut store: ResMut<AppStateStore>,
    mut loading_progress: ResMut<LoadingProgress>,
) {
    if loading_progress.objects_loaded {
        return;
    }
    let Some(manifest) = loader.handle.as_ref().and_then(|h| manifests.get(h)) else {
        return;
    };

    if let Err(e) = store.upsert_objects(manifest.objects.iter().map(|entry| entry.record.clone())) {
        error!("Failed to seed object records: {}", e);
        return;
    }

    for entry in &manifest.objects {
        spawn_mountable_object(&mut commands, &entry.record, entry.transform());
    }

    info!("✓ {} scene objects loaded", manifest.objects.len());
    loading_progress.objects_loaded = true;
}
