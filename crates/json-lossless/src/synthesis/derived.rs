use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use super::{Immutable, SynthesizedType, Synthesizer};
use crate::bag::ValueBag;
use crate::classify::classify;
use crate::codec::{assemble, capture_bag, check_known, CatchAll, Codec, CodecOptions};
use crate::descriptor::TypeDescriptor;
use crate::error::{LosslessError, Result};

/// An instance of the type derived from an immutable base type `T`.
///
/// The base instance is reachable read-only through `Deref`; only the bag
/// accepts writes after construction, and only through [`CatchAll`]. The
/// instance remembers the codec options it was created with and encodes with
/// them through `Serialize` as well.
pub struct Derived<T> {
    base: T,
    other: ValueBag,
    type_: Arc<SynthesizedType>,
    options: CodecOptions,
}

impl<T> Derived<T> {
    pub fn base(&self) -> &T {
        &self.base
    }

    pub fn into_base(self) -> T {
        self.base
    }

    pub fn into_parts(self) -> (T, ValueBag) {
        (self.base, self.other)
    }

    pub fn synthesized_type(&self) -> &SynthesizedType {
        &self.type_
    }
}

impl<T> Deref for Derived<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.base
    }
}

impl<T> CatchAll for Derived<T> {
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

impl<T: Clone> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            other: self.other.clone(),
            type_: self.type_.clone(),
            options: self.options.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.type_.name())
            .field("base", &self.base)
            .field(SynthesizedType::BAG_FIELD, &self.other)
            .finish()
    }
}

impl<T: PartialEq> PartialEq for Derived<T> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.other == other.other
    }
}

/// Encodes as one flat object, in the field order of the codec that created
/// the instance.
impl<T: Immutable> Serialize for Derived<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Synthesized::<T>::from_type(self.type_.clone())
            .with_options(self.options.clone())
            .encode(self)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

/// Decodes against the type the global [`Synthesizer`] derives for `T`, with
/// default options.
impl<'de, T: Immutable> Deserialize<'de> for Derived<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let document = Value::deserialize(deserializer)?;
        Synthesizer::global()
            .synthesize::<T>()
            .and_then(|synthesized| synthesized.decode(&document))
            .map_err(D::Error::custom)
    }
}

/// Handle on the derived type of `T`; also its [`Codec`].
pub struct Synthesized<T> {
    type_: Arc<SynthesizedType>,
    options: CodecOptions,
    _base: PhantomData<fn() -> T>,
}

impl<T> Clone for Synthesized<T> {
    fn clone(&self) -> Self {
        Self {
            type_: self.type_.clone(),
            options: self.options.clone(),
            _base: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Synthesized<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synthesized")
            .field("type", &self.type_.name())
            .field("options", &self.options)
            .finish()
    }
}

impl<T: Immutable> Synthesized<T> {
    pub(crate) fn from_type(type_: Arc<SynthesizedType>) -> Self {
        Self {
            type_,
            options: CodecOptions::default(),
            _base: PhantomData,
        }
    }

    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn synthesized_type(&self) -> &Arc<SynthesizedType> {
        &self.type_
    }

    /// The mirrored constructor: same parameters, same order as the base
    /// type's. The new instance starts with an empty bag.
    pub fn new_instance(&self, arguments: Vec<Value>) -> Result<Derived<T>> {
        let bindings = self.type_.constructor();
        let descriptor = self.type_.descriptor();
        if arguments.len() != bindings.len() {
            return Err(LosslessError::TypeMismatch {
                type_name: descriptor.name().to_string(),
                field: None,
                reason: format!(
                    "constructor takes {} arguments, got {}",
                    bindings.len(),
                    arguments.len()
                ),
            });
        }
        let mut slots = Vec::with_capacity(arguments.len());
        for (binding, value) in bindings.iter().zip(arguments) {
            binding
                .type_
                .check(&value)
                .map_err(|reason| descriptor.type_mismatch(&binding.field, reason))?;
            slots.push((binding.field.clone(), Some(value)));
        }
        let base = T::construct(super::ConstructorArgs::new(descriptor.name(), slots))?;
        Ok(self.wrap(base))
    }

    /// Wraps an existing base instance with an empty bag.
    pub fn wrap(&self, base: T) -> Derived<T> {
        Derived {
            base,
            other: ValueBag::for_type(self.type_.descriptor().clone()),
            type_: self.type_.clone(),
            options: self.options.clone(),
        }
    }
}

impl<T: Immutable> Codec for Synthesized<T> {
    type Record = Derived<T>;

    fn descriptor(&self) -> &TypeDescriptor {
        self.type_.descriptor()
    }

    fn decode(&self, document: &Value) -> Result<Derived<T>> {
        let descriptor = self.type_.descriptor();
        let classification = classify(document, descriptor)?;
        let known = check_known(descriptor, &classification)?;
        let base = T::construct(self.type_.arguments(&known))?;
        Ok(Derived {
            base,
            other: capture_bag(descriptor.clone(), classification)?,
            type_: self.type_.clone(),
            options: self.options.clone(),
        })
    }

    fn encode(&self, record: &Derived<T>) -> Result<Value> {
        let descriptor = self.type_.descriptor();
        let serialized = serde_json::to_value(&record.base)
            .map_err(|e| descriptor.encode_error(None, e.to_string()))?;
        assemble(descriptor, serialized, &record.other, &self.options)
    }
}
