// ============================================================================
// Numeric Module
// Fixed-point price representation and its error types
// ============================================================================

mod errors;
mod fixed_decimal;

pub use errors::{NumericError, NumericResult};
pub use fixed_decimal::{FixedDecimal, Price};
