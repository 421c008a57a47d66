//! json-lossless-util - JSON comparison utilities for json-lossless
//!
//! Equality here is semantic: object keys compare regardless of order, arrays
//! compare element-wise and numbers compare by exact decimal value.

pub mod json_diff;
pub mod json_equal;
pub mod number;

// Re-exports for convenience
pub use json_diff::{diff, Difference, DifferenceKind};
pub use json_equal::deep_equal;
pub use number::{exact_number_eq, to_decimal};
