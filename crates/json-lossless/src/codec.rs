//! The decode/encode contract shared by every kind of augmented record.
//!
//! A [`Codec`] turns a document into a record holding typed known fields plus
//! a [`ValueBag`] of everything else, and turns it back into one flat
//! document. The helpers here implement the parts every codec has in common:
//! checking known fields against their declared types on the way in, and
//! merging the serialized known fields with the bag on the way out.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

use crate::bag::{Anchor, ValueBag};
use crate::classify::Classification;
use crate::descriptor::TypeDescriptor;
use crate::error::{LosslessError, Result};

/// Publishes the known-field descriptor of a record type.
///
/// Implementations usually keep the descriptor in a `static OnceLock` and
/// hand out clones of the `Arc`.
pub trait Described {
    fn descriptor() -> Arc<TypeDescriptor>;
}

/// Catch-all hook pair: the getter exposes every unknown field for encoding,
/// the setter stores one more.
///
/// The setter refuses names the record's type declares with
/// [`LosslessError::DuplicateKnownField`].
pub trait CatchAll {
    fn any(&self) -> &ValueBag;

    fn set(&mut self, name: &str, value: Value) -> Result<()>;

    /// Drops an unknown field, keeping the order of the rest.
    fn remove(&mut self, name: &str) -> Option<Value>;
}

/// A mutable record that keeps its bag in a field of its own, usually a
/// `#[serde(skip)]` one.
///
/// Such a record gets [`CatchAll`] for free. Its bag is bound to the record's
/// descriptor on the first write through [`CatchAll::set`], so a record built
/// in code or by plain serde refuses known names just like a decoded one.
pub trait BagField: Described {
    fn bag(&self) -> &ValueBag;

    fn bag_mut(&mut self) -> &mut ValueBag;
}

impl<T: BagField> CatchAll for T {
    fn any(&self) -> &ValueBag {
        self.bag()
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let bag = self.bag_mut();
        bag.bind(T::descriptor())?;
        bag.set(name, value).map(|_| ())
    }

    fn remove(&mut self, name: &str) -> Option<Value> {
        self.bag_mut().remove(name)
    }
}

/// Order of top-level fields in encoded documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldOrder {
    /// Known fields in declared order, then unknown fields in captured order.
    #[default]
    Declared,
    /// Known fields in the order the source document listed them, with each
    /// unknown field put back next to the known field it followed.
    Document,
}

/// Codec configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecOptions {
    pub field_order: FieldOrder,
}

impl CodecOptions {
    pub fn with_field_order(mut self, field_order: FieldOrder) -> Self {
        self.field_order = field_order;
        self
    }
}

/// Decodes documents into augmented records and encodes them back.
pub trait Codec {
    type Record;

    fn descriptor(&self) -> &TypeDescriptor;

    /// Either returns a fully populated record or fails; no partial record
    /// is ever visible.
    fn decode(&self, document: &Value) -> Result<Self::Record>;

    fn encode(&self, record: &Self::Record) -> Result<Value>;
}

/// Type-checks the known fields of a classified document and makes sure no
/// required field is missing. Returns them keyed by name, in document order.
pub(crate) fn check_known(
    descriptor: &TypeDescriptor,
    classification: &Classification,
) -> Result<Map<String, Value>> {
    let mut known = Map::new();
    for (name, value) in &classification.known {
        if let Some(field) = descriptor.field(name) {
            field
                .type_
                .check(value)
                .map_err(|reason| descriptor.type_mismatch(name, reason))?;
        }
        known.insert(name.clone(), value.clone());
    }
    for field in descriptor.fields() {
        if !field.optional && !known.contains_key(&field.name) {
            return Err(descriptor.type_mismatch(&field.name, "required field is missing"));
        }
    }
    Ok(known)
}

/// Moves the unknown fields of a classified document into a fresh bag owned
/// by `descriptor`.
pub(crate) fn capture_bag(
    descriptor: Arc<TypeDescriptor>,
    classification: Classification,
) -> Result<ValueBag> {
    let layout = classification.known_layout();
    let mut bag = ValueBag::for_type(descriptor);
    for field in classification.unknown {
        bag.capture(field.name, field.value, field.anchor)?;
    }
    bag.set_layout(layout);
    Ok(bag)
}

/// Builds the output document from a record's serialized known fields and
/// its bag.
///
/// # Errors
///
/// [`LosslessError::Encode`] if `serialized` is not an object, lacks a
/// required field, holds a value that does not fit its declared type or
/// holds a field the type does not declare.
/// [`LosslessError::DuplicateKnownField`] if the bag holds a known name
/// (only possible for a bag that was never bound to the type).
pub(crate) fn assemble(
    descriptor: &TypeDescriptor,
    serialized: Value,
    bag: &ValueBag,
    options: &CodecOptions,
) -> Result<Value> {
    let Value::Object(serialized) = serialized else {
        return Err(descriptor.encode_error(None, "record did not serialize to a JSON object"));
    };
    if let Some(extra) = serialized.keys().find(|k| !descriptor.is_known(k)) {
        return Err(descriptor.encode_error(Some(extra.as_str()), "serialized field is not declared"));
    }
    for field in descriptor.fields() {
        match serialized.get(&field.name) {
            Some(value) => field
                .type_
                .check(value)
                .map_err(|reason| descriptor.encode_error(Some(field.name.as_str()), reason))?,
            None if !field.optional => {
                return Err(descriptor.encode_error(Some(field.name.as_str()), "required field is not set"))
            }
            None => {}
        }
    }
    if let Some((name, _)) = bag.entries().find(|(name, _)| descriptor.is_known(name)) {
        return Err(LosslessError::DuplicateKnownField {
            type_name: descriptor.name().to_string(),
            field: name.to_string(),
        });
    }

    log::trace!(
        "{}: encoding {} known and {} unknown fields",
        descriptor.name(),
        serialized.len(),
        bag.len()
    );
    let mut out = Map::new();
    match options.field_order {
        FieldOrder::Declared => {
            for field in descriptor.fields() {
                if let Some(value) = serialized.get(&field.name) {
                    out.insert(field.name.clone(), value.clone());
                }
            }
            for (name, value) in bag.entries() {
                out.insert(name.to_string(), value.clone());
            }
        }
        FieldOrder::Document => {
            let mut order: Vec<&str> = Vec::with_capacity(descriptor.fields().len());
            for name in bag.layout() {
                if descriptor.is_known(name) && !order.contains(&name.as_str()) {
                    order.push(name);
                }
            }
            for field in descriptor.fields() {
                if !order.contains(&field.name.as_str()) {
                    order.push(&field.name);
                }
            }

            let mut emitted: HashSet<&str> = HashSet::new();
            for (name, value, anchor) in bag.anchored() {
                if *anchor == Anchor::Start {
                    out.insert(name.to_string(), value.clone());
                    emitted.insert(name);
                }
            }
            for known in order {
                let Some(value) = serialized.get(known) else {
                    continue;
                };
                out.insert(known.to_string(), value.clone());
                for (name, value, anchor) in bag.anchored() {
                    if matches!(anchor, Anchor::After(after) if after == known) {
                        out.insert(name.to_string(), value.clone());
                        emitted.insert(name);
                    }
                }
            }
            for (name, value) in bag.entries() {
                if !emitted.contains(name) {
                    out.insert(name.to_string(), value.clone());
                }
            }
        }
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::descriptor::FieldType;
    use serde_json::json;

    fn contact() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptor::new("Contact")
                .prop("homePhone", FieldType::Str)
                .prop("email", FieldType::Str)
                .opt("nickname", FieldType::Str.nullable()),
        )
    }

    fn keys(value: &Value) -> Vec<&str> {
        value.as_object().unwrap().keys().map(String::as_str).collect()
    }

    fn round_trip(doc: &Value, options: &CodecOptions) -> Value {
        let d = contact();
        let c = classify(doc, &d).unwrap();
        let known = check_known(&d, &c).unwrap();
        let bag = capture_bag(d.clone(), c).unwrap();
        assemble(&d, Value::Object(known), &bag, options).unwrap()
    }

    #[test]
    fn test_check_known_reports_type_mismatch() {
        let d = contact();
        let c = classify(&json!({"homePhone": 1, "email": "e"}), &d).unwrap();
        assert_eq!(
            check_known(&d, &c),
            Err(LosslessError::TypeMismatch {
                type_name: "Contact".into(),
                field: Some("homePhone".into()),
                reason: "expected str, found integer".into()
            })
        );
    }

    #[test]
    fn test_check_known_reports_missing_required() {
        let d = contact();
        let c = classify(&json!({"email": "e"}), &d).unwrap();
        let err = check_known(&d, &c).unwrap_err();
        assert!(matches!(err, LosslessError::TypeMismatch { field: Some(f), .. } if f == "homePhone"));
    }

    #[test]
    fn test_declared_order_puts_bag_last() {
        let doc = json!({"a": 1, "email": "e", "b": 2, "homePhone": "h"});
        let out = round_trip(&doc, &CodecOptions::default());
        assert_eq!(keys(&out), vec!["homePhone", "email", "a", "b"]);
    }

    #[test]
    fn test_document_order_reproduces_source_layout() {
        let doc = json!({"a": 1, "email": "e", "b": 2, "c": 3, "homePhone": "h", "d": 4});
        let options = CodecOptions::default().with_field_order(FieldOrder::Document);
        let out = round_trip(&doc, &options);
        assert_eq!(keys(&out), vec!["a", "email", "b", "c", "homePhone", "d"]);
    }

    #[test]
    fn test_document_order_places_programmatic_entries_last() {
        let d = contact();
        let c = classify(&json!({"homePhone": "h", "x": 1, "email": "e"}), &d).unwrap();
        let known = check_known(&d, &c).unwrap();
        let mut bag = capture_bag(d.clone(), c).unwrap();
        bag.set("added", json!(true)).unwrap();
        let options = CodecOptions::default().with_field_order(FieldOrder::Document);
        let out = assemble(&d, Value::Object(known), &bag, &options).unwrap();
        assert_eq!(keys(&out), vec!["homePhone", "x", "email", "added"]);
    }

    #[test]
    fn test_assemble_rejects_missing_required() {
        let d = contact();
        let err = assemble(&d, json!({"email": "e"}), &ValueBag::new(), &CodecOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            LosslessError::Encode {
                type_name: "Contact".into(),
                field: Some("homePhone".into()),
                reason: "required field is not set".into()
            }
        );
    }

    #[test]
    fn test_assemble_rejects_undeclared_and_non_object() {
        let d = contact();
        let bag = ValueBag::new();
        let opts = CodecOptions::default();
        assert!(assemble(&d, json!({"homePhone": "h", "email": "e", "zzz": 1}), &bag, &opts).is_err());
        assert!(assemble(&d, json!("flat"), &bag, &opts).is_err());
        assert!(assemble(&d, json!({"homePhone": null, "email": "e"}), &bag, &opts).is_err());
    }

    #[test]
    fn test_assemble_rejects_unbound_bag_collision() {
        let d = contact();
        let mut bag = ValueBag::new();
        bag.set("email", json!("other")).unwrap();
        let err = assemble(&d, json!({"homePhone": "h", "email": "e"}), &bag, &CodecOptions::default())
            .unwrap_err();
        assert!(matches!(err, LosslessError::DuplicateKnownField { .. }));
    }
}
