//! Records typed by a runtime descriptor.
//!
//! When the target type is only known at runtime (a descriptor loaded from a
//! file, say) there is no Rust struct to decode known fields into. A
//! [`DynamicRecord`] keeps them as checked JSON values instead, next to the
//! usual bag.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::bag::ValueBag;
use crate::classify::classify;
use crate::codec::{assemble, capture_bag, check_known, CatchAll, Codec, CodecOptions};
use crate::descriptor::TypeDescriptor;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
    known: Map<String, Value>,
    other: ValueBag,
    descriptor: Arc<TypeDescriptor>,
}

impl DynamicRecord {
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn get_known(&self, name: &str) -> Option<&Value> {
        self.known.get(name)
    }

    /// Replaces the value of a known field after checking its declared type.
    pub fn set_known(&mut self, name: &str, value: Value) -> Result<Option<Value>> {
        let Some(field) = self.descriptor.field(name) else {
            return Err(self.descriptor.type_mismatch(name, "not a declared field"));
        };
        field
            .type_
            .check(&value)
            .map_err(|reason| self.descriptor.type_mismatch(name, reason))?;
        Ok(self.known.insert(name.to_string(), value))
    }

    /// Known field values, in the order they were decoded or set.
    pub fn known(&self) -> &Map<String, Value> {
        &self.known
    }
}

impl CatchAll for DynamicRecord {
    fn any(&self) -> &ValueBag {
        &self.other
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.other.set(name, value).map(|_| ())
    }

    fn remove(&mut self, name: &str) -> Option<Value> {
        self.other.remove(name)
    }
}

/// Codec for records described at runtime.
#[derive(Debug, Clone)]
pub struct DynamicCodec {
    descriptor: Arc<TypeDescriptor>,
    options: CodecOptions,
}

impl DynamicCodec {
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self::with_options(descriptor, CodecOptions::default())
    }

    pub fn with_options(descriptor: TypeDescriptor, options: CodecOptions) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            options,
        }
    }
}

impl Codec for DynamicCodec {
    type Record = DynamicRecord;

    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn decode(&self, document: &Value) -> Result<DynamicRecord> {
        let classification = classify(document, &self.descriptor)?;
        let known = check_known(&self.descriptor, &classification)?;
        Ok(DynamicRecord {
            known,
            other: capture_bag(self.descriptor.clone(), classification)?,
            descriptor: self.descriptor.clone(),
        })
    }

    fn encode(&self, record: &DynamicRecord) -> Result<Value> {
        assemble(
            &self.descriptor,
            Value::Object(record.known.clone()),
            &record.other,
            &self.options,
        )
    }
}
