//! Structural differences between two JSON values.
//!
//! Uses the same equality rules as [`deep_equal`](crate::deep_equal) but,
//! instead of stopping at the first mismatch, collects the path of every
//! place where the two values disagree.

use serde_json::{Map, Value};

use crate::number::exact_number_eq;

/// What kind of disagreement was found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifferenceKind {
    /// Present in the expected value, absent in the actual one.
    Missing,
    /// Absent in the expected value, present in the actual one.
    Unexpected,
    /// Both sides are of the same JSON type but hold different values.
    Value,
    /// The two sides are of different JSON types.
    Type,
}

impl DifferenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Unexpected => "unexpected",
            Self::Value => "value",
            Self::Type => "type",
        }
    }
}

/// One disagreement between an expected and an actual value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Unescaped path steps from the root. Array indexes are decimal strings.
    pub path: Vec<String>,
    pub kind: DifferenceKind,
}

/// Lists every path at which `actual` differs from `expected`.
///
/// An empty result means the values are semantically equal. Array length
/// mismatches are reported per missing or extra index.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_lossless_util::{diff, DifferenceKind};
///
/// let expected = json!({"a": 1, "b": {"c": [1, 2]}});
/// let actual = json!({"b": {"c": [1, 3]}, "d": true});
///
/// let diffs = diff(&expected, &actual);
/// assert_eq!(diffs.len(), 3);
/// assert_eq!(diffs[0].path, vec!["a"]);
/// assert_eq!(diffs[0].kind, DifferenceKind::Missing);
/// ```
pub fn diff(expected: &Value, actual: &Value) -> Vec<Difference> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    diff_inner(expected, actual, &mut path, &mut out);
    out
}

fn diff_inner(expected: &Value, actual: &Value, path: &mut Vec<String>, out: &mut Vec<Difference>) {
    let kind = match (expected, actual) {
        (Value::Null, Value::Null) => return,
        (Value::Bool(a), Value::Bool(b)) if a == b => return,
        (Value::Number(a), Value::Number(b)) if exact_number_eq(a, b) => return,
        (Value::String(a), Value::String(b)) if a == b => return,
        (Value::Bool(_), Value::Bool(_))
        | (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_)) => DifferenceKind::Value,
        (Value::Array(a), Value::Array(b)) => {
            diff_arrays(a, b, path, out);
            return;
        }
        (Value::Object(a), Value::Object(b)) => {
            diff_objects(a, b, path, out);
            return;
        }
        _ => DifferenceKind::Type,
    };
    out.push(Difference {
        path: path.clone(),
        kind,
    });
}

fn diff_arrays(expected: &[Value], actual: &[Value], path: &mut Vec<String>, out: &mut Vec<Difference>) {
    for i in 0..expected.len().max(actual.len()) {
        path.push(i.to_string());
        match (expected.get(i), actual.get(i)) {
            (Some(a), Some(b)) => diff_inner(a, b, path, out),
            (Some(_), None) => out.push(Difference {
                path: path.clone(),
                kind: DifferenceKind::Missing,
            }),
            (None, Some(_)) => out.push(Difference {
                path: path.clone(),
                kind: DifferenceKind::Unexpected,
            }),
            (None, None) => {}
        }
        path.pop();
    }
}

fn diff_objects(
    expected: &Map<String, Value>,
    actual: &Map<String, Value>,
    path: &mut Vec<String>,
    out: &mut Vec<Difference>,
) {
    for (key, a) in expected {
        path.push(key.clone());
        match actual.get(key) {
            Some(b) => diff_inner(a, b, path, out),
            None => out.push(Difference {
                path: path.clone(),
                kind: DifferenceKind::Missing,
            }),
        }
        path.pop();
    }
    for key in actual.keys() {
        if !expected.contains_key(key) {
            path.push(key.clone());
            out.push(Difference {
                path: path.clone(),
                kind: DifferenceKind::Unexpected,
            });
            path.pop();
        }
    }
}
