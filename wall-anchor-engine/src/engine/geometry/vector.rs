use bevy::prelude::*;

/// Normalise an `{x, y, z}`-shaped JSON value (or a `[x, y, z]` array) into a fresh `Vec3`.
///
/// Missing or non-numeric components default to 0. The input is never mutated.
pub fn to_vector3(input: &serde_json::Value) -> Vec3 {
    if let Some(items) = input.as_array() {
        let component = |i: usize| items.get(i).and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        return Vec3::new(component(0), component(1), component(2));
    }

    let component = |key: &str| input.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    Vec3::new(component("x"), component("y"), component("z"))
}

/// Serde adapter for host-facing points: writes `{x, y, z}`, reads either shape via [`to_vector3`].
pub mod xyz {
    use bevy::prelude::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    struct Xyz {
        x: f32,
        y: f32,
        z: f32,
    }

    pub fn serialize<S: Serializer>(point: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
        Xyz {
            x: point.x,
            y: point.y,
            z: point.z,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(super::to_vector3(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_object_shaped_points() {
        let v = to_vector3(&json!({"x": 1.0, "y": -2.5, "z": 3.0}));
        assert_eq!(v, Vec3::new(1.0, -2.5, 3.0));
    }

    #[test]
    fn missing_fields_default_to_zero() {
        assert_eq!(to_vector3(&json!({"y": 2.0})), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(to_vector3(&json!(null)), Vec3::ZERO);
        assert_eq!(to_vector3(&json!({"x": "abc"})), Vec3::ZERO);
    }

    #[test]
    fn reads_array_shaped_points() {
        assert_eq!(to_vector3(&json!([4.0, 5.0])), Vec3::new(4.0, 5.0, 0.0));
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Tagged {
        #[serde(with = "xyz")]
        at: Vec3,
    }

    #[test]
    fn xyz_adapter_writes_objects_and_reads_both_shapes() {
        let written = serde_json::to_value(Tagged {
            at: Vec3::new(1.0, 2.0, 3.0),
        })
        .unwrap();
        assert_eq!(written, json!({"at": {"x": 1.0, "y": 2.0, "z": 3.0}}));

        let from_array: Tagged = serde_json::from_value(json!({"at": [4.0, 5.0, 6.0]})).unwrap();
        assert_eq!(from_array.at, Vec3::new(4.0, 5.0, 6.0));
    }
}
