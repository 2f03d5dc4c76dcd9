// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod order;
pub mod order_book;

pub use order::{OrderAction, OrderRecord, OrderStatus, OrderType, Side};
pub use order_book::{BookSide, PriceLevel};
