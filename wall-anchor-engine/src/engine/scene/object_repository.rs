use bevy::prelude::*;
use constants::coordinate_system::OBJECTS_STATE_PATH;
use serde::{Deserialize, Serialize};

use super::state_store::{AppStateStore, StoreError, StoreResult};

/// Mounting point on an object, stored in the object's local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub id: String,
    pub object_id: String,
    #[serde(with = "crate::engine::geometry::xyz")]
    pub position: Vec3,
}

/// Persisted object as held by the state store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub anchors: Vec<Anchor>,
}

/// Read/write access to object records.
///
/// Anchor updates replace the whole list; implementations must not merge.
pub trait ObjectRepository {
    fn get(&self, id: &str) -> StoreResult<ObjectRecord>;

    fn replace_anchors(&mut self, id: &str, anchors: Vec<Anchor>) -> StoreResult<()>;
}

impl AppStateStore {
    /// All object records under the `objects` path.
    pub fn objects(&self) -> StoreResult<Vec<ObjectRecord>> {
        Ok(self
            .get_typed::<Vec<ObjectRecord>>(OBJECTS_STATE_PATH)?
            .unwrap_or_default())
    }

    /// Add or replace records by id, keeping existing order.
    pub fn upsert_objects(&mut self, records: impl IntoIterator<Item = ObjectRecord>) -> StoreResult<()> {
        let mut objects = self.objects()?;
        for record in records {
            match objects.iter_mut().find(|existing| existing.id == record.id) {
                Some(existing) => *existing = record,
                None => objects.push(record),
            }
        }
        self.set_typed(OBJECTS_STATE_PATH, &objects)
    }
}

impl ObjectRepository for AppStateStore {
    fn get(&self, id: &str) -> StoreResult<ObjectRecord> {
        self.objects()?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| StoreError::ObjectNotFound(id.to_string()))
    }

    fn replace_anchors(&mut self, id: &str, anchors: Vec<Anchor>) -> StoreResult<()> {
        let mut objects = self.objects()?;
        let record = objects
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| StoreError::ObjectNotFound(id.to_string()))?;
        record.anchors = anchors;

        // Single write of the whole list.
        self.set_typed(OBJECTS_STATE_PATH, &objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with_frame() -> AppStateStore {
        AppStateStore::from_value(json!({
            "objects": [
                {"id": "frame", "width": 0.6, "height": 0.4, "anchors": []},
                {"id": "shelf", "width": 0.9, "height": 0.25}
            ]
        }))
    }

    #[test]
    fn get_resolves_records_by_id() {
        let store = store_with_frame();
        let shelf = store.get("shelf").unwrap();
        assert_eq!(shelf.width, 0.9);
        assert!(shelf.anchors.is_empty());
        assert!(matches!(store.get("lamp"), Err(StoreError::ObjectNotFound(_))));
    }

    #[test]
    fn replace_anchors_touches_only_target() {
        let mut store = store_with_frame();
        let anchor = Anchor {
            id: "anchor_1_0".to_string(),
            object_id: "frame".to_string(),
            position: Vec3::new(0.0, 0.1, 0.01),
        };
        store.replace_anchors("frame", vec![anchor.clone()]).unwrap();

        assert_eq!(store.get("frame").unwrap().anchors, vec![anchor]);
        assert!(store.get("shelf").unwrap().anchors.is_empty());
    }

    #[test]
    fn anchors_serialise_with_camel_case_keys() {
        let anchor = Anchor {
            id: "a".to_string(),
            object_id: "frame".to_string(),
            position: Vec3::ZERO,
        };
        let value = serde_json::to_value(&anchor).unwrap();
        assert!(value.get("objectId").is_some());
        assert_eq!(value["position"], json!({"x": 0.0, "y": 0.0, "z": 0.0}));
    }

    #[test]
    fn upsert_replaces_existing_records() {
        let mut store = store_with_frame();
        store
            .upsert_objects([ObjectRecord {
                id: "frame".to_string(),
                width: 1.0,
                height: 1.0,
                anchors: Vec::new(),
            }])
            .unwrap();
        assert_eq!(store.objects().unwrap().len(), 2);
        assert_eq!(store.get("frame").unwrap().width, 1.0);
    }
}
