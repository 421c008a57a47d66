//! The value bag: catch-all storage for fields a record type does not declare.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::{LosslessError, Result};

/// Where an unknown field sat relative to the known fields of the document it
/// was captured from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Before every known field.
    Start,
    /// Right after the named known field (possibly after other unknown fields).
    After(String),
    /// Added programmatically, after everything else.
    End,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    value: Value,
    anchor: Anchor,
}

/// Ordered mapping of unknown field name to untyped JSON value.
///
/// A bag bound to a record type (see [`ValueBag::for_type`]) refuses names the
/// type declares, so a field is never held both as a known field and as an
/// unknown one. A default bag is unbound and accepts any name.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use json_lossless::{FieldType, TypeDescriptor, ValueBag};
///
/// let contact = Arc::new(TypeDescriptor::new("Contact").prop("email", FieldType::Str));
/// let mut bag = ValueBag::for_type(contact);
///
/// bag.set("mobilePhone", json!("07123 123456")).unwrap();
/// bag.set("fax", json!(null)).unwrap();
/// assert!(bag.set("email", json!("a@b.com")).is_err());
///
/// let names: Vec<_> = bag.entries().map(|(name, _)| name).collect();
/// assert_eq!(names, vec!["mobilePhone", "fax"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValueBag {
    entries: IndexMap<String, Entry>,
    /// Known field names in the order the source document listed them.
    layout: Vec<String>,
    owner: Option<Arc<TypeDescriptor>>,
}

impl PartialEq for ValueBag {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl ValueBag {
    /// Creates an empty, unbound bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty bag owned by a record of the given type.
    pub fn for_type(owner: Arc<TypeDescriptor>) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    /// Descriptor of the owning record type, if bound.
    pub fn owner(&self) -> Option<&TypeDescriptor> {
        self.owner.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|e| &e.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Inserts or overwrites an entry and returns the previous value.
    ///
    /// An overwritten entry keeps its position; a new one goes last.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Result<Option<Value>> {
        let name = name.into();
        self.ensure_unknown(&name)?;
        if let Some(entry) = self.entries.get_mut(&name) {
            return Ok(Some(std::mem::replace(&mut entry.value, value)));
        }
        self.entries.insert(
            name,
            Entry {
                value,
                anchor: Anchor::End,
            },
        );
        Ok(None)
    }

    /// Removes an entry, keeping the relative order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name).map(|e| e.value)
    }

    /// Sets every entry of `other`, in its order. Either all entries are
    /// accepted or the bag is left unchanged.
    pub fn merge(&mut self, other: &ValueBag) -> Result<()> {
        for name in other.entries.keys() {
            self.ensure_unknown(name)?;
        }
        for (name, entry) in &other.entries {
            self.set(name.clone(), entry.value.clone())?;
        }
        Ok(())
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), &e.value))
    }

    /// Entries in insertion order, with the position each was captured at.
    pub fn anchored(&self) -> impl Iterator<Item = (&str, &Value, &Anchor)> {
        self.entries
            .iter()
            .map(|(k, e)| (k.as_str(), &e.value, &e.anchor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Known field names in source document order, as seen at capture time.
    pub fn layout(&self) -> &[String] {
        &self.layout
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.entries
            .into_iter()
            .map(|(k, e)| (k, e.value))
            .collect()
    }

    /// Binds the bag to `owner`, checking the entries it already holds.
    ///
    /// Binding to the type it is already bound to is a no-op. On error the
    /// bag is left unchanged.
    pub fn bind(&mut self, owner: Arc<TypeDescriptor>) -> Result<()> {
        if let Some(current) = &self.owner {
            if Arc::ptr_eq(current, &owner) || **current == *owner {
                return Ok(());
            }
        }
        if let Some(name) = self.entries.keys().find(|name| owner.is_known(name)) {
            return Err(LosslessError::DuplicateKnownField {
                type_name: owner.name().to_string(),
                field: name.clone(),
            });
        }
        self.owner = Some(owner);
        Ok(())
    }

    pub(crate) fn capture(&mut self, name: String, value: Value, anchor: Anchor) -> Result<()> {
        self.ensure_unknown(&name)?;
        self.entries.insert(name, Entry { value, anchor });
        Ok(())
    }

    pub(crate) fn set_layout(&mut self, layout: Vec<String>) {
        self.layout = layout;
    }

    fn ensure_unknown(&self, name: &str) -> Result<()> {
        match &self.owner {
            Some(owner) if owner.is_known(name) => Err(LosslessError::DuplicateKnownField {
                type_name: owner.name().to_string(),
                field: name.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Serializes as a flat JSON object in insertion order.
impl Serialize for ValueBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, &entry.value)?;
        }
        map.end()
    }
}
