//! json-lossless — keep unknown fields across typed JSON round trips.
//!
//! Decoding a document into a schema-bound record normally drops every field
//! the schema does not declare. The codecs in this crate split a document
//! into known fields, decoded into the record type, and unknown fields, kept
//! verbatim in a [`ValueBag`], and merge the two again on encode.
//!
//! Three kinds of records are supported:
//! - mutable records that carry their own bag ([`MutableCodec`]),
//! - immutable records that cannot, augmented through a derived type built by
//!   the [`Synthesizer`] ([`Synthesized`], [`Derived`]),
//! - records typed only by a runtime descriptor ([`DynamicCodec`]).
//!
//! [`verify`] checks that a round trip through any of them is lossless.

pub mod bag;
pub mod classify;
pub mod cli;
pub mod codec;
pub mod descriptor;
pub mod dynamic;
pub mod error;
pub mod record;
pub mod synthesis;
pub mod verify;

// Re-export the most commonly used types at crate root
pub use bag::{Anchor, ValueBag};
pub use classify::{classify, Classification, UnknownField};
pub use codec::{BagField, CatchAll, Codec, CodecOptions, Described, FieldOrder};
pub use descriptor::{Constructor, FieldDescriptor, FieldType, NumFormat, Param, TypeDescriptor};
pub use dynamic::{DynamicCodec, DynamicRecord};
pub use error::{LosslessError, Result};
pub use record::{decode, encode, MutableCodec};
pub use synthesis::{Binding, ConstructorArgs, Derived, Immutable, Synthesized, SynthesizedType, Synthesizer};
pub use verify::{verify, Mismatch, Report};
