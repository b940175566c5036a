//! Repairs saved Keras architecture JSON written by a different library
//! version than the one the layer schema in [`crate::model`] describes.

use serde_json::Value;

/// Input-shape key written by newer Keras releases.
pub const SAVED_SHAPE_KEY: &str = "batch_shape";
/// Input-shape key the layer schema reads.
pub const RUNTIME_SHAPE_KEY: &str = "batch_input_shape";
pub const FALLBACK_DTYPE: &str = "float32";

/// Rewrites a model config tree into the schema the runtime reads.
///
/// - `batch_shape` is renamed to `batch_input_shape`
/// - a `dtype` given as a policy object (or a string naming a policy)
///   collapses to `"float32"`
///
/// Applied recursively to every nested object and array.
pub fn migrate_model_config(config: Value) -> Value {
    match config {
        Value::Array(items) => Value::Array(items.into_iter().map(migrate_model_config).collect()),
        Value::Object(mut map) => {
            if let Some(shape) = map.remove(SAVED_SHAPE_KEY) {
                map.insert(RUNTIME_SHAPE_KEY.to_string(), shape);
            }

            if map.get("dtype").is_some_and(is_dtype_policy) {
                map.insert("dtype".to_string(), Value::String(FALLBACK_DTYPE.to_string()));
            }

            Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, migrate_model_config(value)))
                    .collect(),
            )
        }
        other => other,
    }
}

fn is_dtype_policy(dtype: &Value) -> bool {
    match dtype {
        Value::Object(_) => true,
        Value::String(name) => name.contains("Policy"),
        other => other.to_string().contains("Policy"),
    }
}
