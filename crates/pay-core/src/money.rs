//! # Money
//!
//! Conversion between the major-unit decimals used in request/response
//! bodies and the integer minor units the processor expects.

/// Minor units per major unit. Applied to every currency passed through.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Currency used when a request does not name one
pub const DEFAULT_CURRENCY: &str = "brl";

/// Largest magnitude accepted in minor units; past 2^53 an `f64` no longer
/// holds every whole cent
pub const MAX_MINOR_UNITS: i64 = 1 << 53;

/// Convert a decimal amount to the smallest currency unit (cents, etc.)
///
/// `None` for non-finite amounts and amounts beyond [`MAX_MINOR_UNITS`],
/// which would otherwise saturate when cast.
pub fn to_minor_units(amount: f64) -> Option<i64> {
    let minor = (amount * MINOR_UNITS_PER_MAJOR as f64).round();
    if minor.is_finite() && minor.abs() <= MAX_MINOR_UNITS as f64 {
        Some(minor as i64)
    } else {
        None
    }
}

/// Convert from smallest unit back to decimal
pub fn from_minor_units(amount: i64) -> f64 {
    amount as f64 / MINOR_UNITS_PER_MAJOR as f64
}

/// Format a minor-unit amount for logs (e.g. "49.90 BRL")
pub fn display(amount: i64, currency: &str) -> String {
    format!("{:.2} {}", from_minor_units(amount), currency.to_uppercase())
}
