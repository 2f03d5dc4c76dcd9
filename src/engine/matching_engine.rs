// ============================================================================
// Matching Engine
// Routes instructions to per-instrument books and merges their event streams
// ============================================================================

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{OrderAction, OrderRecord};
use crate::engine::clock::ExecutionClock;
use crate::engine::instrument_book::InstrumentBook;
use crate::interfaces::{EventHandler, NoOpEventHandler};

/// Strictly single-threaded matching engine.
///
/// Owns one [`InstrumentBook`] per symbol (created on first sight) and the
/// process-wide [`ExecutionClock`] they all stamp events with. `process` is a
/// blocking call that returns once every event it caused sits in the owning
/// book's result log; `drain` merges the logs into the final output stream.
pub struct MatchingEngine {
    books: HashMap<String, InstrumentBook>,
    /// Instruments in first-seen order, so the drain merge is deterministic.
    instruments: Vec<String>,
    clock: ExecutionClock,
    event_handler: Box<dyn EventHandler>,
}

impl MatchingEngine {
    pub fn new() -> Self {
        MatchingEngineBuilder::new().build()
    }

    /// Feed one validated instruction into the engine.
    ///
    /// Records the ingest layer already rejected pass straight through to the
    /// instrument's result log; everything else dispatches on its action.
    pub fn process(&mut self, order: OrderRecord) {
        if !self.books.contains_key(&order.instrument) {
            self.instruments.push(order.instrument.clone());
            self.books.insert(
                order.instrument.clone(),
                InstrumentBook::new(order.instrument.clone()),
            );
        }
        let book = self
            .books
            .get_mut(&order.instrument)
            .expect("book exists after insert");

        let emitted_from = book.results().len();

        if order.is_rejected() {
            debug!(
                instrument = %order.instrument,
                order_id = order.order_id,
                "echoing pre-rejected record"
            );
            book.append_result(order);
        } else {
            match order.action {
                OrderAction::New => book.add_order(order, &mut self.clock),
                OrderAction::Modify => book.modify_order(order, &mut self.clock),
                OrderAction::Cancel => book.cancel_order(order, &mut self.clock),
            }
        }

        for record in &book.results()[emitted_from..] {
            self.event_handler.on_record(record);
        }
    }

    /// Merge every instrument's result log into one stream, stably sorted by
    /// timestamp: ties keep the order the books emitted them in. The logs are
    /// left empty afterwards.
    pub fn drain(&mut self) -> Vec<OrderRecord> {
        let mut merged = Vec::new();
        for instrument in &self.instruments {
            if let Some(book) = self.books.get_mut(instrument) {
                merged.append(&mut book.take_results());
            }
        }
        merged.sort_by_key(|record| record.timestamp);
        merged
    }

    /// The book for `instrument`, if any instruction has touched it.
    pub fn book(&self, instrument: &str) -> Option<&InstrumentBook> {
        self.books.get(instrument)
    }

    /// Number of instruments seen so far.
    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent construction for [`MatchingEngine`].
///
/// # Example
/// ```
/// use clob_engine::engine::MatchingEngineBuilder;
/// use clob_engine::interfaces::LoggingEventHandler;
///
/// let engine = MatchingEngineBuilder::new()
///     .with_event_handler(Box::new(LoggingEventHandler))
///     .build();
/// ```
pub struct MatchingEngineBuilder {
    event_handler: Box<dyn EventHandler>,
}

impl MatchingEngineBuilder {
    pub fn new() -> Self {
        Self {
            event_handler: Box::new(NoOpEventHandler),
        }
    }

    /// Observe every record as it is appended to a result log.
    pub fn with_event_handler(mut self, handler: Box<dyn EventHandler>) -> Self {
        self.event_handler = handler;
        self
    }

    /// Build the engine with a freshly reset execution clock.
    pub fn build(self) -> MatchingEngine {
        MatchingEngine {
            books: HashMap::new(),
            instruments: Vec::new(),
            clock: ExecutionClock::new(),
            event_handler: self.event_handler,
        }
    }
}

impl Default for MatchingEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderStatus, OrderType, Side};
    use crate::numeric::Price;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn price(int: i64, frac: u64) -> Price {
        Price::from_parts(int, frac).unwrap()
    }

    fn limit(
        ts: u64,
        id: u64,
        instrument: &str,
        side: Side,
        quantity: u64,
        p: Price,
    ) -> OrderRecord {
        OrderRecord::new(ts, id, instrument, side, OrderType::Limit, quantity, p, OrderAction::New)
    }

    #[test]
    fn test_routing_is_per_instrument() {
        let mut engine = MatchingEngine::new();

        engine.process(limit(1_000, 1, "AAPL", Side::Buy, 100, price(150, 25)));
        engine.process(limit(2_000, 2, "GOOG", Side::Sell, 100, price(150, 25)));

        // Same price, opposite sides, different instruments: no cross
        assert_eq!(engine.instrument_count(), 2);
        assert_eq!(engine.book("AAPL").unwrap().best_bid(), Some(price(150, 25)));
        assert_eq!(engine.book("GOOG").unwrap().best_ask(), Some(price(150, 25)));

        let output = engine.drain();
        assert_eq!(output.len(), 2);
        assert!(output.iter().all(|r| r.status == Some(OrderStatus::Pending)));
    }

    #[test]
    fn test_pre_rejected_records_pass_through() {
        let mut engine = MatchingEngine::new();

        let mut rejected = limit(1_000, 1, "AAPL", Side::Buy, 100, price(150, 25));
        rejected.status = Some(OrderStatus::Rejected);
        engine.process(rejected);

        let output = engine.drain();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].status, Some(OrderStatus::Rejected));
        assert_eq!(output[0].timestamp, 1_000);
        // No book state was created for it
        assert!(engine.book("AAPL").unwrap().best_bid().is_none());
    }

    #[test]
    fn test_drain_is_stably_sorted_by_timestamp() {
        let mut engine = MatchingEngine::new();

        engine.process(limit(3_000, 1, "AAPL", Side::Buy, 100, price(150, 25)));
        engine.process(limit(1_000, 2, "AAPL", Side::Buy, 100, price(150, 20)));
        engine.process(limit(2_000, 3, "AAPL", Side::Buy, 100, price(150, 30)));

        let output = engine.drain();
        let timestamps: Vec<u64> = output.iter().map(|r| r.timestamp).collect();
        let mut sorted = timestamps.clone();
        sorted.sort_unstable();
        assert_eq!(timestamps, sorted);
    }

    #[test]
    fn test_drain_empties_the_logs() {
        let mut engine = MatchingEngine::new();
        engine.process(limit(1_000, 1, "AAPL", Side::Buy, 100, price(150, 25)));

        assert_eq!(engine.drain().len(), 1);
        assert!(engine.drain().is_empty());
    }

    #[test]
    fn test_event_handler_sees_every_record() {
        struct CountingHandler(Rc<RefCell<usize>>);
        impl EventHandler for CountingHandler {
            fn on_record(&self, _record: &OrderRecord) {
                *self.0.borrow_mut() += 1;
            }
        }

        let seen = Rc::new(RefCell::new(0));
        let mut engine = MatchingEngineBuilder::new()
            .with_event_handler(Box::new(CountingHandler(Rc::clone(&seen))))
            .build();

        engine.process(limit(1_000, 1, "AAPL", Side::Buy, 100, price(150, 25)));
        engine.process(limit(2_000, 2, "AAPL", Side::Sell, 50, price(150, 25)));

        // One PENDING plus a taker/maker pair
        assert_eq!(*seen.borrow(), 3);
    }

    #[test]
    fn test_shared_clock_across_instruments() {
        let mut engine = MatchingEngine::new();

        // Identical input timestamps on two instruments: the shared clock
        // forces distinct emitted timestamps.
        engine.process(limit(5_000, 1, "AAPL", Side::Buy, 10, price(1, 0)));
        engine.process(limit(5_000, 2, "GOOG", Side::Buy, 10, price(1, 0)));

        let output = engine.drain();
        assert_eq!(output.len(), 2);
        assert_ne!(output[0].timestamp, output[1].timestamp);
    }
}
