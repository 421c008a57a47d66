//! Lossless augmentation of immutable record types.
//!
//! An immutable record sets its fields once, through a constructor, and has
//! nowhere to keep fields it does not declare. Instead of editing such a
//! type, the [`Synthesizer`] derives a companion type for it: the base
//! instance plus a [`ValueBag`](crate::ValueBag), with the catch-all hook
//! pair wired up and the base constructor mirrored parameter for parameter.
//! Derived types are built once per base type and cached.
//!
//! The base type publishes its constructor as a binding table in its
//! [`TypeDescriptor`]: each parameter names the document field it is filled
//! from. Decoding consults that table to gather positional arguments and
//! forwards them to [`Immutable::construct`].

mod derived;

pub use derived::{Derived, Synthesized};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::{type_name, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::codec::Described;
use crate::descriptor::{FieldType, TypeDescriptor};
use crate::error::{LosslessError, Result};

/// A record type whose fields are fixed at construction.
///
/// Its descriptor must declare exactly one constructor whose parameters are
/// all bound to declared fields.
pub trait Immutable: Described + Serialize + Sized + 'static {
    /// Builds an instance from positional constructor arguments.
    fn construct(args: ConstructorArgs) -> Result<Self>;
}

/// Positional arguments for a constructor call, tagged with their bindings.
#[derive(Debug, Clone)]
pub struct ConstructorArgs {
    type_name: String,
    slots: Vec<(String, Option<Value>)>,
}

impl ConstructorArgs {
    pub(crate) fn new(type_name: &str, slots: Vec<(String, Option<Value>)>) -> Self {
        Self {
            type_name: type_name.to_string(),
            slots,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Field the parameter at `position` is bound to.
    pub fn binding(&self, position: usize) -> Option<&str> {
        self.slots.get(position).map(|(name, _)| name.as_str())
    }

    /// Takes the argument at `position` and converts it to `V`.
    ///
    /// An absent argument converts from `null`, so an optional field maps
    /// naturally onto an `Option` parameter.
    pub fn take<V: DeserializeOwned>(&mut self, position: usize) -> Result<V> {
        let Some((binding, slot)) = self.slots.get_mut(position) else {
            return Err(LosslessError::Synthesis {
                type_name: self.type_name.clone(),
                reason: format!("constructor has no parameter {position}"),
            });
        };
        let value = slot.take().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| LosslessError::TypeMismatch {
            type_name: self.type_name.clone(),
            field: Some(binding.clone()),
            reason: e.to_string(),
        })
    }
}

/// A constructor parameter after synthesis: its binding is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub field: String,
    pub position: usize,
    pub type_: FieldType,
}

/// Description of a derived type built for one base type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedType {
    base_id: TypeId,
    base_name: &'static str,
    name: String,
    descriptor: Arc<TypeDescriptor>,
    constructor: Vec<Binding>,
}

impl SynthesizedType {
    /// Name of the storage field the derived type adds.
    pub const BAG_FIELD: &'static str = "other";
    /// Name of the catch-all getter hook.
    pub const ANY_GETTER: &'static str = "any";
    /// Name of the catch-all setter hook.
    pub const ANY_SETTER: &'static str = "set";

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_id(&self) -> TypeId {
        self.base_id
    }

    /// Rust path of the base type.
    pub fn base_name(&self) -> &'static str {
        self.base_name
    }

    /// Known fields, shared with the base type.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// The mirrored constructor, in call order.
    pub fn constructor(&self) -> &[Binding] {
        &self.constructor
    }

    /// Gathers constructor arguments from checked known field values.
    pub(crate) fn arguments(&self, known: &Map<String, Value>) -> ConstructorArgs {
        let slots = self
            .constructor
            .iter()
            .map(|b| (b.field.clone(), known.get(&b.field).cloned()))
            .collect();
        ConstructorArgs::new(self.descriptor.name(), slots)
    }

    fn build<T: Immutable>() -> Result<Self> {
        let descriptor = T::descriptor();
        let base = descriptor.name().to_string();
        let unsupported = |reason: String| LosslessError::UnsupportedBaseType {
            type_name: base.clone(),
            reason,
        };
        let failed = |reason: String| LosslessError::Synthesis {
            type_name: base.clone(),
            reason,
        };

        let constructor = match descriptor.constructors() {
            [] => return Err(unsupported("no public constructor to mirror".into())),
            [constructor] => constructor,
            many => {
                return Err(unsupported(format!(
                    "{} public constructors, cannot pick one",
                    many.len()
                )))
            }
        };

        // Copy the binding table.
        let mut bindings = Vec::with_capacity(constructor.params.len());
        for (position, param) in constructor.params.iter().enumerate() {
            let Some(field) = &param.binding else {
                return Err(unsupported(format!(
                    "constructor parameter {position} has no field binding"
                )));
            };
            bindings.push(Binding {
                field: field.clone(),
                position,
                type_: param.type_.clone(),
            });
        }

        // Materialize: the copied constructor must agree with the known fields.
        let mut bound = HashSet::new();
        for binding in &bindings {
            let Some(field) = descriptor.field(&binding.field) else {
                return Err(failed(format!(
                    "constructor parameter {} is bound to undeclared field {:?}",
                    binding.position, binding.field
                )));
            };
            if field.type_ != binding.type_ {
                return Err(failed(format!(
                    "constructor parameter {} has type {} but field {:?} is declared {}",
                    binding.position, binding.type_, binding.field, field.type_
                )));
            }
            if !bound.insert(binding.field.as_str()) {
                return Err(failed(format!(
                    "field {:?} is bound to more than one constructor parameter",
                    binding.field
                )));
            }
        }
        if let Some(field) = descriptor.fields().iter().find(|f| !bound.contains(f.name.as_str())) {
            return Err(failed(format!(
                "field {:?} cannot be set through the constructor",
                field.name
            )));
        }

        Ok(Self {
            base_id: TypeId::of::<T>(),
            base_name: type_name::<T>(),
            name: format!("Lossless{base}"),
            descriptor,
            constructor: bindings,
        })
    }
}

type Slot = Arc<OnceLock<Result<Arc<SynthesizedType>>>>;

/// Cache of derived types, keyed by base type.
///
/// The map lock is only held to look up or insert a per-type slot; synthesis
/// runs inside the slot, so concurrent first requests for the same base type
/// wait for a single attempt and share its outcome. Entries are never
/// invalidated.
#[derive(Debug, Default)]
pub struct Synthesizer {
    types: RwLock<HashMap<TypeId, Slot>>,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide synthesizer.
    pub fn global() -> &'static Synthesizer {
        static GLOBAL: OnceLock<Synthesizer> = OnceLock::new();
        GLOBAL.get_or_init(Synthesizer::new)
    }

    /// Returns the derived type for `T`, building it on first use.
    ///
    /// # Errors
    ///
    /// [`LosslessError::UnsupportedBaseType`] if `T` has no single
    /// constructor or a parameter lacks its binding;
    /// [`LosslessError::Synthesis`] if the bindings disagree with the declared
    /// fields. Failures are cached like successes.
    pub fn synthesize<T: Immutable>(&self) -> Result<Synthesized<T>> {
        let slot = self.slot(TypeId::of::<T>());
        let mut built = false;
        let synthesized = slot
            .get_or_init(|| {
                built = true;
                SynthesizedType::build::<T>().map(Arc::new)
            })
            .clone()?;
        if built {
            log::debug!(
                "synthesized {} from {}",
                synthesized.name(),
                synthesized.base_name()
            );
        } else {
            log::debug!("reusing synthesized {}", synthesized.name());
        }
        Ok(Synthesized::from_type(synthesized))
    }

    /// Number of base types synthesized or attempted so far.
    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: TypeId) -> Slot {
        if let Some(slot) = self
            .types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return slot.clone();
        }
        self.types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_default()
            .clone()
    }
}
