use serde_json::Value;

use crate::number::exact_number_eq;

/// Performs a semantic deep equality check between two JSON values.
///
/// This function compares values recursively:
/// - Null, booleans and strings compare exactly
/// - Numbers compare by exact decimal value (`1.0 == 1`, no float rounding)
/// - Arrays compare element-by-element, in order
/// - Objects compare key-by-key, regardless of key order
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_lossless_util::json_equal::deep_equal;
///
/// let a = json!({"foo": [1, 2, 3], "bar": null});
/// let b = json!({"bar": null, "foo": [1, 2, 3]});
/// let c = json!({"foo": [1, 3, 2], "bar": null});
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => exact_number_eq(a, b),
        (Value::String(a), Value::String(b)) => a == b,

        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len() && arr_a.iter().zip(arr_b).all(|(a, b)| deep_equal(a, b))
        }

        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            obj_a.iter().all(|(key, val_a)| match obj_b.get(key) {
                Some(val_b) => deep_equal(val_a, val_b),
                None => false,
            })
        }

        // Different types are never equal
        _ => false,
    }
}
