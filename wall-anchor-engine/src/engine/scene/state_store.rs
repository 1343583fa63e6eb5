use bevy::prelude::*;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    ObjectNotFound(String),
    #[error("malformed record at '{path}': {source}")]
    MalformedRecord {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Application state addressed by dot-separated key paths (`"wall.width"`).
///
/// `update_state` replaces the whole value at a path; there are no partial
/// merges, so a writer always sees either the old or the new value.
#[derive(Resource, Debug, Clone)]
pub struct AppStateStore {
    root: Value,
}

impl Default for AppStateStore {
    fn default() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }
}

impl AppStateStore {
    pub fn from_value(root: Value) -> Self {
        let root = if root.is_object() {
            root
        } else {
            Value::Object(Map::new())
        };
        Self { root }
    }

    /// Value stored at `path`, if any. An empty path returns the root.
    pub fn get_state(&self, path: &str) -> Option<&Value> {
        path_segments(path).try_fold(&self.root, |node, key| node.get(key))
    }

    /// Replace the value at `path`, creating intermediate objects as needed.
    pub fn update_state(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path_segments(path).collect();
        if segments.is_empty() {
            self.root = if value.is_object() {
                value
            } else {
                Value::Object(Map::new())
            };
            return;
        }

        insert_at(&mut self.root, &segments, value);
        debug!("State updated at '{}'", path);
    }

    /// Deserialize the value at `path` into `T`. Missing paths return `None`.
    pub fn get_typed<T: serde::de::DeserializeOwned>(&self, path: &str) -> StoreResult<Option<T>> {
        match self.get_state(path) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|source| StoreError::MalformedRecord {
                    path: path.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it at `path`.
    pub fn set_typed<T: serde::Serialize>(&mut self, path: &str, value: &T) -> StoreResult<()> {
        let value = serde_json::to_value(value)?;
        self.update_state(path, value);
        Ok(())
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}

/// Write `value` under `segments`, turning scalar nodes along the way into objects.
fn insert_at(node: &mut Value, segments: &[&str], value: Value) {
    let Some((key, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(key.to_string()).or_insert(Value::Null);
        insert_at(child, rest, value);
    }
}
