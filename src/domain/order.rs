// ============================================================================
// Order Domain Model
// ============================================================================

use crate::numeric::Price;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("BUY") {
            Ok(Side::Buy)
        } else if s.eq_ignore_ascii_case("SELL") {
            Ok(Side::Sell)
        } else {
            Err(format!("invalid side: {}", s))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderType {
    Limit,
    Market,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("LIMIT") {
            Ok(OrderType::Limit)
        } else if s.eq_ignore_ascii_case("MARKET") {
            Ok(OrderType::Market)
        } else {
            Err(format!("invalid order type: {}", s))
        }
    }
}

/// The instruction carried by an inbound record. Distinct from [`OrderStatus`]:
/// an event keeps the action that produced it and gains a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderAction {
    New,
    Modify,
    Cancel,
}

impl OrderAction {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderAction::New => "NEW",
            OrderAction::Modify => "MODIFY",
            OrderAction::Cancel => "CANCEL",
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("NEW") {
            Ok(OrderAction::New)
        } else if s.eq_ignore_ascii_case("MODIFY") {
            Ok(OrderAction::Modify)
        } else if s.eq_ignore_ascii_case("CANCEL") {
            Ok(OrderAction::Cancel)
        } else {
            Err(format!("invalid action: {}", s))
        }
    }
}

/// Outcome attached to an emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderStatus {
    Pending,
    PartiallyExecuted,
    Executed,
    Canceled,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::PartiallyExecuted => "PARTIALLY_EXECUTED",
            OrderStatus::Executed => "EXECUTED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Rejected => "REJECTED",
        }
    }

    /// Whether an event with this status closes its logical order.
    /// Rejections are transient for duplicate/unknown ids, so an earlier
    /// accepted order is unaffected by a later rejected instruction.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Executed | OrderStatus::Canceled | OrderStatus::Rejected
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Order Record
// ============================================================================

/// The single carrier for both instructions and emitted events.
///
/// On input, `status` is `None` unless the ingest layer already rejected the
/// record. On output, `status` is always populated, `quantity` holds the
/// remaining size after the event, and `executed_quantity`/`execution_price`/
/// `counterparty_id` describe the single trade the event records (zero when
/// there is none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub timestamp: u64,
    pub order_id: u64,
    pub instrument: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: u64,
    pub price: Price,
    pub action: OrderAction,

    pub status: Option<OrderStatus>,
    pub executed_quantity: u64,
    pub execution_price: Price,
    pub counterparty_id: u64,
}

impl OrderRecord {
    /// Build an instruction record; the event-only fields start zeroed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: u64,
        order_id: u64,
        instrument: impl Into<String>,
        side: Side,
        order_type: OrderType,
        quantity: u64,
        price: Price,
        action: OrderAction,
    ) -> Self {
        Self {
            timestamp,
            order_id,
            instrument: instrument.into(),
            side,
            order_type,
            quantity,
            price,
            action,
            status: None,
            executed_quantity: 0,
            execution_price: Price::ZERO,
            counterparty_id: 0,
        }
    }

    pub fn is_market_order(&self) -> bool {
        matches!(self.order_type, OrderType::Market)
    }

    pub fn is_limit_order(&self) -> bool {
        matches!(self.order_type, OrderType::Limit)
    }

    /// True when the ingest layer already adjudicated this record.
    pub fn is_rejected(&self) -> bool {
        self.status == Some(OrderStatus::Rejected)
    }

    /// Zero out the trade-describing fields, leaving the instruction intact.
    pub(crate) fn clear_execution_fields(&mut self) {
        self.executed_quantity = 0;
        self.execution_price = Price::ZERO;
        self.counterparty_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(int: i64, frac: u64) -> Price {
        Price::from_parts(int, frac).unwrap()
    }

    #[test]
    fn test_record_creation() {
        let record = OrderRecord::new(
            1_617_278_400_000_000_000,
            1,
            "AAPL",
            Side::Buy,
            OrderType::Limit,
            100,
            price(150, 25),
            OrderAction::New,
        );

        assert_eq!(record.quantity, 100);
        assert_eq!(record.status, None);
        assert_eq!(record.executed_quantity, 0);
        assert_eq!(record.counterparty_id, 0);
        assert!(record.is_limit_order());
        assert!(!record.is_market_order());
        assert!(!record.is_rejected());
    }

    #[test]
    fn test_side_round_trip() {
        assert_eq!("buy".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("SELL".parse::<Side>().unwrap(), Side::Sell);
        assert!("HOLD".parse::<Side>().is_err());
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.to_string(), "SELL");
    }

    #[test]
    fn test_type_and_action_parsing() {
        assert_eq!("limit".parse::<OrderType>().unwrap(), OrderType::Limit);
        assert_eq!("MARKET".parse::<OrderType>().unwrap(), OrderType::Market);
        assert!("STOP".parse::<OrderType>().is_err());

        assert_eq!("new".parse::<OrderAction>().unwrap(), OrderAction::New);
        assert_eq!("Modify".parse::<OrderAction>().unwrap(), OrderAction::Modify);
        assert!("AMEND".parse::<OrderAction>().is_err());
    }

    #[test]
    fn test_status_terminality() {
        assert!(OrderStatus::Executed.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::PartiallyExecuted.is_terminal());
    }

    #[test]
    fn test_clear_execution_fields() {
        let mut record = OrderRecord::new(
            0,
            7,
            "AAPL",
            Side::Sell,
            OrderType::Limit,
            10,
            price(10, 0),
            OrderAction::New,
        );
        record.executed_quantity = 5;
        record.execution_price = price(10, 0);
        record.counterparty_id = 9;

        record.clear_execution_fields();
        assert_eq!(record.executed_quantity, 0);
        assert_eq!(record.execution_price, Price::ZERO);
        assert_eq!(record.counterparty_id, 0);
        assert_eq!(record.quantity, 10);
    }
}
