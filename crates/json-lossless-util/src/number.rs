use bigdecimal::BigDecimal;
use serde_json::Number;
use std::str::FromStr;

/// Reads a JSON number as an exact decimal, keeping every digit of its
/// source text.
///
/// Returns `None` when the exponent is out of range for a non-zero
/// mantissa. Zero is zero whatever its exponent.
pub fn to_decimal(n: &Number) -> Option<BigDecimal> {
    let text = n.to_string();
    if let Ok(decimal) = BigDecimal::from_str(&text) {
        return Some(decimal);
    }
    let mantissa = text.split(['e', 'E']).next()?;
    BigDecimal::from_str(mantissa)
        .ok()
        .filter(|m| *m == BigDecimal::from(0))
}

/// Compares two JSON numbers by exact decimal value.
///
/// Falls back to comparing the textual representation when either side
/// cannot be read as a decimal.
///
/// # Examples
///
/// ```
/// use json_lossless_util::exact_number_eq;
/// use serde_json::Number;
///
/// let a: Number = serde_json::from_str("2.50").unwrap();
/// let b: Number = serde_json::from_str("2.5").unwrap();
/// let c: Number = serde_json::from_str("2.5000001").unwrap();
/// assert!(exact_number_eq(&a, &b));
/// assert!(!exact_number_eq(&a, &c));
/// ```
pub fn exact_number_eq(a: &Number, b: &Number) -> bool {
    if a.to_string() == b.to_string() {
        return true;
    }
    match (to_decimal(a), to_decimal(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
