//! Round-trip verification.

use json_lossless_pointer::format_json_pointer;
use json_lossless_util::{diff, DifferenceKind};
use serde_json::Value;
use std::fmt;

use crate::codec::Codec;
use crate::error::Result;

/// A path at which the re-encoded document disagrees with the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// JSON Pointer into both documents.
    pub pointer: String,
    pub kind: DifferenceKind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pointer = if self.pointer.is_empty() { "(root)" } else { self.pointer.as_str() };
        write!(f, "{} {}", self.kind.as_str(), pointer)
    }
}

/// Outcome of one round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub mismatches: Vec<Mismatch>,
    /// The re-encoded document.
    pub encoded: Value,
}

impl Report {
    pub fn is_lossless(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn pointers(&self) -> Vec<&str> {
        self.mismatches.iter().map(|m| m.pointer.as_str()).collect()
    }
}

/// Decodes `document` with `codec`, encodes the record again and compares the
/// result with the input.
///
/// Object keys are compared as sets, arrays element-wise and numbers by exact
/// decimal value. An empty mismatch list means the round trip is lossless.
///
/// # Errors
///
/// Whatever `decode` or `encode` fails with.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_lossless::{verify, DynamicCodec, FieldType, TypeDescriptor};
///
/// let codec = DynamicCodec::new(TypeDescriptor::new("T").prop("a", FieldType::Str));
/// let report = verify(&codec, &json!({"a": "x", "b": [1, {"c": null}]})).unwrap();
/// assert!(report.is_lossless());
/// ```
pub fn verify<C: Codec>(codec: &C, document: &Value) -> Result<Report> {
    let record = codec.decode(document)?;
    let encoded = codec.encode(&record)?;
    let mismatches = diff(document, &encoded)
        .into_iter()
        .map(|d| Mismatch {
            pointer: format_json_pointer(&d.path),
            kind: d.kind,
        })
        .collect::<Vec<_>>();
    if mismatches.is_empty() {
        log::trace!("{}: round trip is lossless", codec.descriptor().name());
    } else {
        log::debug!(
            "{}: round trip lost data at {} paths",
            codec.descriptor().name(),
            mismatches.len()
        );
    }
    Ok(Report { mismatches, encoded })
}
