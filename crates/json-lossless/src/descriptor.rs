//! Type descriptors: the known-field view of a record type.
//!
//! A [`TypeDescriptor`] lists the fields a record type declares, in declared
//! order, with the type each field must have. Immutable record types also
//! publish their constructor: an ordered parameter list where each parameter
//! is bound to the document field it is filled from.
//!
//! Descriptors are built in code with [`TypeDescriptor::new`] and the
//! `prop`/`opt`/`constructor` builder methods, or loaded from JSON:
//!
//! ```
//! use json_lossless::descriptor::{FieldType, TypeDescriptor};
//!
//! let descriptor: TypeDescriptor = serde_json::from_str(r#"{
//!     "name": "ContactDetails",
//!     "fields": [
//!         {"name": "homePhone", "type": "str"},
//!         {"name": "email", "type": "str?", "optional": true}
//!     ]
//! }"#).unwrap();
//!
//! assert!(descriptor.is_known("homePhone"));
//! assert!(!descriptor.is_known("mobilePhone"));
//! assert_eq!(
//!     descriptor.field("email").unwrap().type_,
//!     FieldType::Nullable(Box::new(FieldType::Str))
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{LosslessError, Result};

/// Number format of a `num` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumFormat {
    /// Signed or unsigned integer that fits in 64 bits.
    I,
    /// Unsigned integer that fits in 64 bits.
    U,
    /// Any JSON number.
    F,
}

/// Declared type of a known field.
///
/// The textual form used in JSON descriptors is `any`, `bool`, `num`, `int`,
/// `uint`, `str`, `obj`, `arr`, `arr<T>`, with a trailing `?` admitting `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    Any,
    Bool,
    Num(NumFormat),
    Str,
    Obj,
    Arr(Option<Box<FieldType>>),
    Nullable(Box<FieldType>),
}

impl FieldType {
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    pub fn arr_of(element: FieldType) -> Self {
        Self::Arr(Some(Box::new(element)))
    }

    /// Checks that `value` can be bound to a field of this type.
    ///
    /// Returns a human readable reason on failure.
    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        let fits = match self {
            Self::Any => true,
            Self::Nullable(inner) => return if value.is_null() { Ok(()) } else { inner.check(value) },
            Self::Bool => value.is_boolean(),
            Self::Num(NumFormat::F) => value.is_number(),
            Self::Num(NumFormat::I) => value.is_i64() || value.is_u64(),
            Self::Num(NumFormat::U) => value.is_u64(),
            Self::Str => value.is_string(),
            Self::Obj => value.is_object(),
            Self::Arr(None) => value.is_array(),
            Self::Arr(Some(element)) => match value {
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        element.check(item).map_err(|reason| format!("element {i}: {reason}"))?;
                    }
                    true
                }
                _ => false,
            },
        };
        if fits {
            Ok(())
        } else {
            Err(format!("expected {self}, found {}", describe(value)))
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_u64() || n.is_i64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Bool => f.write_str("bool"),
            Self::Num(NumFormat::F) => f.write_str("num"),
            Self::Num(NumFormat::I) => f.write_str("int"),
            Self::Num(NumFormat::U) => f.write_str("uint"),
            Self::Str => f.write_str("str"),
            Self::Obj => f.write_str("obj"),
            Self::Arr(None) => f.write_str("arr"),
            Self::Arr(Some(element)) => write!(f, "arr<{element}>"),
            Self::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_suffix('?') {
            return Ok(inner.parse::<FieldType>()?.nullable());
        }
        if let Some(element) = s.strip_prefix("arr<").and_then(|rest| rest.strip_suffix('>')) {
            return Ok(Self::arr_of(element.parse()?));
        }
        Ok(match s {
            "any" => Self::Any,
            "bool" => Self::Bool,
            "num" => Self::Num(NumFormat::F),
            "int" => Self::Num(NumFormat::I),
            "uint" => Self::Num(NumFormat::U),
            "str" => Self::Str,
            "obj" => Self::Obj,
            "arr" => Self::Arr(None),
            other => return Err(format!("unknown field type {other:?}")),
        })
    }
}

impl TryFrom<String> for FieldType {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.to_string()
    }
}

/// A field declared by a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    /// Optional fields may be absent from a document; required ones may not.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_: FieldType) -> Self {
        Self {
            name: name.into(),
            type_,
            optional: false,
        }
    }

    pub fn new_opt(name: impl Into<String>, type_: FieldType) -> Self {
        Self {
            optional: true,
            ..Self::new(name, type_)
        }
    }
}

/// One constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// The document field this parameter is filled from. `None` when the
    /// parameter carries no binding, which makes the constructor unusable
    /// for decoding.
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    #[serde(rename = "type")]
    pub type_: FieldType,
}

/// A public constructor: parameters in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constructor {
    pub params: Vec<Param>,
}

impl Constructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter bound to the document field `name`.
    pub fn param(mut self, name: impl Into<String>, type_: FieldType) -> Self {
        self.params.push(Param {
            binding: Some(name.into()),
            type_,
        });
        self
    }

    /// Appends a parameter with no field binding.
    pub fn unbound(mut self, type_: FieldType) -> Self {
        self.params.push(Param {
            binding: None,
            type_,
        });
        self
    }

    /// Position of the parameter bound to `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params
            .iter()
            .position(|p| p.binding.as_deref() == Some(name))
    }
}

/// Known fields and construction contract of a record type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTypeDescriptor", into = "RawTypeDescriptor")]
pub struct TypeDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
    constructors: Vec<Constructor>,
    index: HashMap<String, usize>,
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.fields == other.fields
            && self.constructors == other.constructors
    }
}

impl Eq for TypeDescriptor {}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            constructors: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Declares a required field. Redeclaring a name replaces the earlier
    /// declaration in place.
    pub fn prop(self, name: impl Into<String>, type_: FieldType) -> Self {
        self.field_descriptor(FieldDescriptor::new(name, type_))
    }

    /// Declares an optional field.
    pub fn opt(self, name: impl Into<String>, type_: FieldType) -> Self {
        self.field_descriptor(FieldDescriptor::new_opt(name, type_))
    }

    pub fn field_descriptor(mut self, field: FieldDescriptor) -> Self {
        match self.index.get(&field.name) {
            Some(&i) => self.fields[i] = field,
            None => {
                self.index.insert(field.name.clone(), self.fields.len());
                self.fields.push(field);
            }
        }
        self
    }

    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, in declared order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Exact, case-sensitive membership test.
    pub fn is_known(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub(crate) fn type_mismatch(&self, field: &str, reason: impl Into<String>) -> LosslessError {
        LosslessError::TypeMismatch {
            type_name: self.name.clone(),
            field: Some(field.to_string()),
            reason: reason.into(),
        }
    }

    pub(crate) fn encode_error(&self, field: Option<&str>, reason: impl Into<String>) -> LosslessError {
        LosslessError::Encode {
            type_name: self.name.clone(),
            field: field.map(str::to_string),
            reason: reason.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawTypeDescriptor {
    name: String,
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    constructors: Vec<Constructor>,
}

impl TryFrom<RawTypeDescriptor> for TypeDescriptor {
    type Error = LosslessError;

    fn try_from(raw: RawTypeDescriptor) -> Result<Self> {
        let mut descriptor = TypeDescriptor::new(raw.name);
        for field in raw.fields {
            if descriptor.is_known(&field.name) {
                return Err(LosslessError::Descriptor(format!(
                    "field {:?} declared twice in {}",
                    field.name, descriptor.name
                )));
            }
            descriptor = descriptor.field_descriptor(field);
        }
        descriptor.constructors = raw.constructors;
        Ok(descriptor)
    }
}

impl From<TypeDescriptor> for RawTypeDescriptor {
    fn from(descriptor: TypeDescriptor) -> Self {
        Self {
            name: descriptor.name,
            fields: descriptor.fields,
            constructors: descriptor.constructors,
        }
    }
}
