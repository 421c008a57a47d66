//! Field classification: splitting a document into known and unknown fields.

use serde_json::Value;

use crate::bag::Anchor;
use crate::descriptor::TypeDescriptor;
use crate::error::{LosslessError, Result};

/// A top-level field the target type does not declare.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownField {
    pub name: String,
    pub value: Value,
    pub anchor: Anchor,
}

/// A document's top-level fields, partitioned against a type descriptor.
///
/// Both lists keep document order and never share a name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub known: Vec<(String, Value)>,
    pub unknown: Vec<UnknownField>,
}

impl Classification {
    /// Names of the known fields, in document order.
    pub fn known_layout(&self) -> Vec<String> {
        self.known.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Partitions the top-level fields of `document` into the fields `descriptor`
/// declares and everything else.
///
/// Matching is exact and case-sensitive. Nested values are not inspected: an
/// unknown object is kept whole. Duplicate keys never reach this point, the
/// parser keeps the last occurrence.
///
/// # Errors
///
/// [`LosslessError::Classification`] if the document is not a JSON object.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_lossless::{classify, FieldType, TypeDescriptor};
///
/// let d = TypeDescriptor::new("Contact").prop("email", FieldType::Str);
/// let c = classify(&json!({"phone": "1", "email": "a@b.com"}), &d).unwrap();
/// assert_eq!(c.known, vec![("email".to_string(), json!("a@b.com"))]);
/// assert_eq!(c.unknown[0].name, "phone");
/// ```
pub fn classify(document: &Value, descriptor: &TypeDescriptor) -> Result<Classification> {
    let Value::Object(fields) = document else {
        return Err(LosslessError::Classification {
            type_name: descriptor.name().to_string(),
            reason: format!("expected a JSON object at the top level, found {}", kind(document)),
        });
    };

    let mut out = Classification::default();
    let mut anchor = Anchor::Start;
    for (name, value) in fields {
        if descriptor.is_known(name) {
            log::trace!("{}: known field {name:?}", descriptor.name());
            out.known.push((name.clone(), value.clone()));
            anchor = Anchor::After(name.clone());
        } else {
            log::trace!("{}: unknown field {name:?}", descriptor.name());
            out.unknown.push(UnknownField {
                name: name.clone(),
                value: value.clone(),
                anchor: anchor.clone(),
            });
        }
    }
    Ok(out)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldType;
    use serde_json::json;

    fn contact() -> TypeDescriptor {
        TypeDescriptor::new("Contact")
            .prop("homePhone", FieldType::Str)
            .prop("email", FieldType::Str)
    }

    #[test]
    fn test_partitions_in_document_order() {
        let doc = json!({
            "homePhone": "01234 567890",
            "mobilePhone": "07123 123456",
            "email": "someone@email.com",
            "address": {"line1": "1 Toad Road"}
        });
        let c = classify(&doc, &contact()).unwrap();
        assert_eq!(c.known_layout(), vec!["homePhone", "email"]);
        let unknown: Vec<_> = c.unknown.iter().map(|f| (f.name.as_str(), f.anchor.clone())).collect();
        assert_eq!(
            unknown,
            vec![
                ("mobilePhone", Anchor::After("homePhone".into())),
                ("address", Anchor::After("email".into())),
            ]
        );
        // nested unknown structure is kept whole
        assert_eq!(c.unknown[1].value, json!({"line1": "1 Toad Road"}));
    }

    #[test]
    fn test_leading_unknown_fields_anchor_at_start() {
        let c = classify(&json!({"x": 1, "y": 2, "email": "e"}), &contact()).unwrap();
        assert!(c.unknown.iter().all(|f| f.anchor == Anchor::Start));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let c = classify(&json!({"Email": "e", "HOMEPHONE": "h"}), &contact()).unwrap();
        assert!(c.known.is_empty());
        assert_eq!(c.unknown.len(), 2);
    }

    #[test]
    fn test_duplicate_keys_last_occurrence_wins() {
        let doc: Value = serde_json::from_str(r#"{"email": "first", "x": 1, "email": "second"}"#).unwrap();
        let c = classify(&doc, &contact()).unwrap();
        assert_eq!(c.known, vec![("email".to_string(), json!("second"))]);
        assert_eq!(c.unknown.len(), 1);
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        for doc in [json!([1, 2]), json!("s"), json!(null), json!(3)] {
            assert!(matches!(
                classify(&doc, &contact()),
                Err(LosslessError::Classification { .. })
            ));
        }
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(classify(&json!({}), &contact()).unwrap(), Classification::default());
    }
}
