#![allow(dead_code)]

use json_lossless::{
    BagField, Constructor, ConstructorArgs, Described, FieldType, Immutable, Result,
    TypeDescriptor, ValueBag,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, OnceLock};

pub const CONTACT_DETAILS: &str = r#"{
    "homePhone": "01234 567890",
    "mobilePhone": "07123 123456",
    "email": "a@b.com",
    "address": {
        "line1": "1 Toad Road",
        "city": "London",
        "postcode": "E1 1TD"
    }
}"#;

pub fn contact_details_document() -> Value {
    serde_json::from_str(CONTACT_DETAILS).unwrap()
}

pub fn keys(value: &Value) -> Vec<&str> {
    value.as_object().unwrap().keys().map(String::as_str).collect()
}

fn contact_descriptor(name: &str, with_constructor: bool) -> TypeDescriptor {
    let descriptor = TypeDescriptor::new(name)
        .prop("homePhone", FieldType::Str)
        .prop("email", FieldType::Str);
    if with_constructor {
        descriptor.constructor(
            Constructor::new()
                .param("homePhone", FieldType::Str)
                .param("email", FieldType::Str),
        )
    } else {
        descriptor
    }
}

/// Plain serde record: whatever it does not declare is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub home_phone: String,
    pub email: String,
}

/// Mutable record carrying its own bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutableLosslessContactDetails {
    pub home_phone: String,
    pub email: String,
    #[serde(skip)]
    pub other: ValueBag,
}

impl Described for MutableLosslessContactDetails {
    fn descriptor() -> Arc<TypeDescriptor> {
        static D: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
        D.get_or_init(|| Arc::new(contact_descriptor("MutableLosslessContactDetails", false)))
            .clone()
    }
}

impl BagField for MutableLosslessContactDetails {
    fn bag(&self) -> &ValueBag {
        &self.other
    }

    fn bag_mut(&mut self) -> &mut ValueBag {
        &mut self.other
    }
}

/// Immutable record: fields are set once, through `new`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImmutableContactDetails {
    home_phone: String,
    email: String,
}

impl ImmutableContactDetails {
    pub fn new(home_phone: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            home_phone: home_phone.into(),
            email: email.into(),
        }
    }

    pub fn home_phone(&self) -> &str {
        &self.home_phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Described for ImmutableContactDetails {
    fn descriptor() -> Arc<TypeDescriptor> {
        static D: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
        D.get_or_init(|| Arc::new(contact_descriptor("ImmutableContactDetails", true)))
            .clone()
    }
}

impl Immutable for ImmutableContactDetails {
    fn construct(mut args: ConstructorArgs) -> Result<Self> {
        Ok(Self::new(args.take::<String>(0)?, args.take::<String>(1)?))
    }
}
