//! Mutable augmented records.
//!
//! A mutable record is an ordinary serde struct that carries its own
//! [`ValueBag`] in a `#[serde(skip)]` field and exposes it through
//! [`BagField`], which gives it the [`CatchAll`] hooks. Its serde derives
//! only ever see the known fields; the codec
//! routes everything else through the bag.
//!
//! ```
//! use std::sync::{Arc, OnceLock};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//! use json_lossless::{BagField, CatchAll, Described, FieldType, TypeDescriptor, ValueBag};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Contact {
//!     email: String,
//!     #[serde(skip)]
//!     other: ValueBag,
//! }
//!
//! impl Described for Contact {
//!     fn descriptor() -> Arc<TypeDescriptor> {
//!         static D: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
//!         D.get_or_init(|| Arc::new(TypeDescriptor::new("Contact").prop("email", FieldType::Str)))
//!             .clone()
//!     }
//! }
//!
//! impl BagField for Contact {
//!     fn bag(&self) -> &ValueBag { &self.other }
//!     fn bag_mut(&mut self) -> &mut ValueBag { &mut self.other }
//! }
//!
//! let doc = json!({"email": "a@b.com", "fax": "n/a"});
//! let mut contact: Contact = json_lossless::decode(&doc).unwrap();
//! contact.email = "c@d.com".into();
//! assert!(contact.set("email", json!("e@f.com")).is_err());
//! assert_eq!(
//!     json_lossless::encode(&contact).unwrap(),
//!     json!({"email": "c@d.com", "fax": "n/a"})
//! );
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::classify::classify;
use crate::codec::{assemble, capture_bag, check_known, BagField, Codec, CodecOptions};
use crate::descriptor::TypeDescriptor;
use crate::error::{LosslessError, Result};

/// Codec for a mutable record type `T`.
pub struct MutableCodec<T> {
    descriptor: Arc<TypeDescriptor>,
    options: CodecOptions,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for MutableCodec<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            options: self.options.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for MutableCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutableCodec")
            .field("type", &self.descriptor.name())
            .field("options", &self.options)
            .finish()
    }
}

impl<T> MutableCodec<T>
where
    T: BagField + Serialize + DeserializeOwned,
{
    pub fn new() -> Self {
        Self::with_options(CodecOptions::default())
    }

    pub fn with_options(options: CodecOptions) -> Self {
        Self {
            descriptor: T::descriptor(),
            options,
            _record: PhantomData,
        }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }
}

impl<T> Default for MutableCodec<T>
where
    T: BagField + Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec for MutableCodec<T>
where
    T: BagField + Serialize + DeserializeOwned,
{
    type Record = T;

    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn decode(&self, document: &Value) -> Result<T> {
        let classification = classify(document, &self.descriptor)?;
        let known = check_known(&self.descriptor, &classification)?;
        let mut record: T =
            serde_json::from_value(Value::Object(known)).map_err(|e| LosslessError::TypeMismatch {
                type_name: self.descriptor.name().to_string(),
                field: None,
                reason: e.to_string(),
            })?;
        *record.bag_mut() = capture_bag(self.descriptor.clone(), classification)?;
        Ok(record)
    }

    fn encode(&self, record: &T) -> Result<Value> {
        let serialized = serde_json::to_value(record)
            .map_err(|e| self.descriptor.encode_error(None, e.to_string()))?;
        assemble(&self.descriptor, serialized, record.bag(), &self.options)
    }
}

/// Decodes `document` into a mutable record with default options.
pub fn decode<T>(document: &Value) -> Result<T>
where
    T: BagField + Serialize + DeserializeOwned,
{
    MutableCodec::<T>::new().decode(document)
}

/// Encodes a mutable record with default options.
pub fn encode<T>(record: &T) -> Result<Value>
where
    T: BagField + Serialize + DeserializeOwned,
{
    MutableCodec::<T>::new().encode(record)
}
