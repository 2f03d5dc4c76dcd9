// ============================================================================
// CLOB Engine Library
// Deterministic continuous limit order book with price-time priority
// ============================================================================

//! # CLOB Engine
//!
//! A deterministic continuous limit order book: a batched, timestamped stream
//! of order instructions goes in, a totally ordered stream of execution,
//! rest, cancellation, and rejection events comes out.
//!
//! ## Features
//!
//! - **Price-time priority matching** per instrument (best price first,
//!   earliest arrival breaks ties)
//! - **LIMIT and MARKET orders** with NEW / MODIFY / CANCEL instructions
//! - **Deterministic output**: the same input always produces bit-identical
//!   results, ordered by an engine-owned monotonic execution clock
//! - **CSV boundary layer** for batch files, kept outside the matching core
//!
//! ## Example
//!
//! ```rust
//! use clob_engine::prelude::*;
//!
//! let mut engine = MatchingEngine::new();
//!
//! engine.process(OrderRecord::new(
//!     1_000, 1, "AAPL", Side::Buy, OrderType::Limit, 100,
//!     "150.25".parse::<Price>().unwrap(), OrderAction::New,
//! ));
//! engine.process(OrderRecord::new(
//!     2_000, 2, "AAPL", Side::Sell, OrderType::Limit, 40,
//!     "150.25".parse::<Price>().unwrap(), OrderAction::New,
//! ));
//!
//! // One PENDING rest plus a taker/maker trade pair
//! let events = engine.drain();
//! assert_eq!(events.len(), 3);
//! ```

pub mod domain;
pub mod engine;
pub mod ingest;
pub mod interfaces;
pub mod numeric;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{OrderAction, OrderRecord, OrderStatus, OrderType, Side};
    pub use crate::engine::{ExecutionClock, InstrumentBook, MatchingEngine, MatchingEngineBuilder};
    pub use crate::interfaces::{EventHandler, LoggingEventHandler, NoOpEventHandler};
    pub use crate::numeric::Price;
}


// ── Property-Based Tests ────────────────────────────────────────────
