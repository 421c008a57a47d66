use thiserror::Error;

/// Errors raised while classifying, decoding, encoding or augmenting records.
///
/// Every failure is local to the call that produced it; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LosslessError {
    #[error("cannot classify document for {type_name}: {reason}")]
    Classification { type_name: String, reason: String },
    #[error("type mismatch in {type_name}{}: {reason}", at_field(.field))]
    TypeMismatch {
        type_name: String,
        field: Option<String>,
        reason: String,
    },
    #[error("{field:?} is a known field of {type_name} and cannot be stored as an unknown field")]
    DuplicateKnownField { type_name: String, field: String },
    #[error("cannot augment {type_name}: {reason}")]
    UnsupportedBaseType { type_name: String, reason: String },
    #[error("synthesis of {type_name} failed: {reason}")]
    Synthesis { type_name: String, reason: String },
    #[error("cannot encode {type_name}{}: {reason}", at_field(.field))]
    Encode {
        type_name: String,
        field: Option<String>,
        reason: String,
    },
    #[error("invalid type descriptor: {0}")]
    Descriptor(String),
}

fn at_field(field: &Option<String>) -> String {
    match field {
        Some(field) => format!(" at field {field:?}"),
        None => String::new(),
    }
}

pub type Result<T, E = LosslessError> = std::result::Result<T, E>;
