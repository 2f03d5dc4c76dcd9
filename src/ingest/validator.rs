// ============================================================================
// Record Validation
// Structural checks applied after field parsing
// ============================================================================

use thiserror::Error;

use crate::domain::OrderRecord;

/// Largest accepted order quantity.
pub const MAX_QUANTITY: u64 = 1_000_000_000_000;

/// Why a line or record failed structural validation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("expected 8 fields, found {found}")]
    MalformedLine { found: usize },
    #[error("timestamp is not an unsigned integer")]
    InvalidTimestamp,
    #[error("order id is not an unsigned integer")]
    InvalidOrderId,
    #[error("instrument is empty")]
    EmptyInstrument,
    #[error("side must be BUY or SELL")]
    InvalidSide,
    #[error("type must be LIMIT or MARKET")]
    InvalidType,
    #[error("action must be NEW, MODIFY or CANCEL")]
    InvalidAction,
    #[error("quantity must be an integer in 1..={MAX_QUANTITY}")]
    InvalidQuantity,
    #[error("price is not a number")]
    InvalidPrice,
    #[error("limit price cannot be negative")]
    NegativePrice,
}

/// Validate the bounds a fully parsed record still has to satisfy: non-empty
/// instrument, quantity in range, and a non-negative price for limit orders.
/// Field shape (enums, integers) is already guaranteed by parsing.
pub fn validate_record(record: &OrderRecord) -> Result<(), ValidationError> {
    if record.instrument.trim().is_empty() {
        return Err(ValidationError::EmptyInstrument);
    }
    if record.quantity == 0 || record.quantity > MAX_QUANTITY {
        return Err(ValidationError::InvalidQuantity);
    }
    if record.is_limit_order() && record.price.is_negative() {
        return Err(ValidationError::NegativePrice);
    }
    Ok(())
}
