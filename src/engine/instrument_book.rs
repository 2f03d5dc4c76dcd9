// ============================================================================
// Instrument Book
// Per-instrument order book: two price-indexed sides, order lookup,
// price-time priority execution, and the instrument's result log
// ============================================================================

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::domain::{BookSide, OrderAction, OrderRecord, OrderStatus, OrderType, Side};
use crate::engine::clock::ExecutionClock;
use crate::numeric::Price;

/// The book for one instrument.
///
/// Owns the bid and ask sides, an `order_id -> latest state` lookup holding
/// exactly the orders with at least one unit resting, the set of every
/// `order_id` ever accepted (duplicate NEWs are rejected forever within a
/// run), the per-order cumulative fill counters that MODIFY consults, and the
/// append-only result log.
///
/// The queue copies are authoritative for matching; the lookup is re-synced
/// whenever an order rests, is modified, or leaves the book.
#[derive(Debug)]
pub struct InstrumentBook {
    instrument: String,
    bids: BookSide,
    asks: BookSide,
    order_lookup: HashMap<u64, OrderRecord>,
    accepted_ids: HashSet<u64>,
    executed_totals: HashMap<u64, u64>,
    results: Vec<OrderRecord>,
}

impl InstrumentBook {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            order_lookup: HashMap::new(),
            accepted_ids: HashSet::new(),
            executed_totals: HashMap::new(),
            results: Vec::new(),
        }
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Latest known state of a live resting order.
    pub fn resting_order(&self, order_id: u64) -> Option<&OrderRecord> {
        self.order_lookup.get(&order_id)
    }

    /// Quantity filled so far across every event for this order.
    pub fn cumulative_executed(&self, order_id: u64) -> u64 {
        self.executed_totals.get(&order_id).copied().unwrap_or(0)
    }

    pub fn results(&self) -> &[OrderRecord] {
        &self.results
    }

    pub(crate) fn append_result(&mut self, record: OrderRecord) {
        self.results.push(record);
    }

    pub(crate) fn take_results(&mut self) -> Vec<OrderRecord> {
        std::mem::take(&mut self.results)
    }

    // ========================================================================
    // Instruction entry points
    // ========================================================================

    /// Accept a NEW order: duplicate ids are rejected, everything else is
    /// seeded into the lookup and handed to the execution algorithm.
    pub fn add_order(&mut self, mut order: OrderRecord, clock: &mut ExecutionClock) {
        if self.accepted_ids.contains(&order.order_id) {
            debug!(
                instrument = %self.instrument,
                order_id = order.order_id,
                "duplicate order id, rejecting"
            );
            order.status = Some(OrderStatus::Rejected);
            order.clear_execution_fields();
            self.results.push(order);
            return;
        }

        self.accepted_ids.insert(order.order_id);
        self.executed_totals.insert(order.order_id, 0);

        order.status = Some(OrderStatus::Pending);
        order.clear_execution_fields();
        self.order_lookup.insert(order.order_id, order.clone());

        self.execute(order, clock);
    }

    /// Re-shape a live order. `request.quantity` is the absolute new total;
    /// what already traded is subtracted before the remainder re-enters the
    /// algorithm as a fresh crossing candidate. Side and type are fixed at
    /// NEW time; the request cannot change them.
    pub fn modify_order(&mut self, request: OrderRecord, clock: &mut ExecutionClock) {
        let Some(existing) = self.order_lookup.get(&request.order_id).cloned() else {
            debug!(
                instrument = %self.instrument,
                order_id = request.order_id,
                "modify of unknown order id, rejecting"
            );
            let mut rejected = request;
            rejected.status = Some(OrderStatus::Rejected);
            self.results.push(rejected);
            return;
        };

        self.remove_resting(&existing);

        let cumulative = self.cumulative_executed(request.order_id);
        let remaining = request.quantity.saturating_sub(cumulative);

        if let Some(entry) = self.order_lookup.get_mut(&request.order_id) {
            entry.quantity = request.quantity;
            entry.price = request.price;
        }

        if remaining == 0 {
            // The new total sits at or below what already traded; the order
            // closes without another fill.
            let Some(mut closed) = self.order_lookup.remove(&request.order_id) else {
                return;
            };
            closed.timestamp = clock.next(request.timestamp);
            closed.action = OrderAction::Modify;
            closed.status = Some(OrderStatus::Executed);
            closed.quantity = 0;
            closed.clear_execution_fields();
            self.results.push(closed);
            return;
        }

        let mut processing = existing;
        processing.quantity = remaining;
        processing.price = request.price;
        processing.timestamp = request.timestamp;
        processing.action = OrderAction::Modify;
        self.execute(processing, clock);
    }

    /// Cancel a live order. The emitted event echoes the request's stated
    /// price verbatim; lookup is by id only.
    pub fn cancel_order(&mut self, request: OrderRecord, clock: &mut ExecutionClock) {
        let Some(existing) = self.order_lookup.get(&request.order_id).cloned() else {
            debug!(
                instrument = %self.instrument,
                order_id = request.order_id,
                "cancel of unknown order id, rejecting"
            );
            let mut rejected = request;
            rejected.status = Some(OrderStatus::Rejected);
            self.results.push(rejected);
            return;
        };

        self.remove_resting(&existing);

        let mut canceled = existing;
        canceled.timestamp = clock.next(request.timestamp);
        canceled.action = OrderAction::Cancel;
        canceled.status = Some(OrderStatus::Canceled);
        canceled.quantity = 0;
        canceled.price = request.price;
        canceled.clear_execution_fields();
        self.results.push(canceled);

        self.order_lookup.remove(&request.order_id);
    }

    // ========================================================================
    // Execution
    // ========================================================================

    fn execute(&mut self, order: OrderRecord, clock: &mut ExecutionClock) {
        match order.order_type {
            OrderType::Market => self.execute_market(order, clock),
            OrderType::Limit => self.execute_limit(order, clock),
        }
    }

    /// Walk the opposing side from the best price outward until the order is
    /// filled or liquidity runs out. A market order that trades nothing is
    /// rejected, and whatever is left after partial fills is dropped: market
    /// orders never rest.
    fn execute_market(&mut self, order: OrderRecord, clock: &mut ExecutionClock) {
        let template = self.taker_template(&order);
        let remaining = self.sweep(&order, &template, None, clock);

        if remaining == order.quantity {
            debug!(
                instrument = %self.instrument,
                order_id = order.order_id,
                "market order found no liquidity, rejecting"
            );
            let mut rejected = template;
            rejected.timestamp = clock.next(order.timestamp);
            rejected.action = order.action;
            rejected.status = Some(OrderStatus::Rejected);
            rejected.clear_execution_fields();
            self.results.push(rejected);
        }

        self.order_lookup.remove(&order.order_id);
    }

    /// A limit order that would not trade immediately first announces itself
    /// with a PENDING event, then any crossing quantity sweeps the opposing
    /// side at maker prices, and the residual rests at the incoming price.
    fn execute_limit(&mut self, order: OrderRecord, clock: &mut ExecutionClock) {
        let template = self.taker_template(&order);

        let crosses_now = match order.side {
            Side::Buy => self
                .asks
                .best_price()
                .map_or(false, |ask| ask <= order.price),
            Side::Sell => self
                .bids
                .best_price()
                .map_or(false, |bid| bid >= order.price),
        };
        if !crosses_now {
            let mut pending = template.clone();
            pending.timestamp = clock.next(order.timestamp);
            pending.action = order.action;
            pending.status = Some(OrderStatus::Pending);
            pending.quantity = order.quantity;
            pending.price = order.price;
            pending.clear_execution_fields();
            self.results.push(pending);
        }

        let remaining = self.sweep(&order, &template, Some(order.price), clock);

        if remaining > 0 {
            let mut resting = template;
            resting.quantity = remaining;
            resting.price = order.price;
            self.order_lookup.insert(order.order_id, resting.clone());
            match order.side {
                Side::Buy => self.bids.add_order(resting),
                Side::Sell => self.asks.add_order(resting),
            }
        } else {
            self.order_lookup.remove(&order.order_id);
        }
    }

    /// Price-time sweep shared by market and limit execution. Trades happen
    /// at the resting (maker) price; each trade emits the taker event then
    /// the maker event, both stamped with one freshly assigned execution
    /// timestamp. Returns the taker's unfilled remainder.
    fn sweep(
        &mut self,
        taker: &OrderRecord,
        template: &OrderRecord,
        limit: Option<Price>,
        clock: &mut ExecutionClock,
    ) -> u64 {
        let mut remaining = taker.quantity;

        let Self {
            bids,
            asks,
            order_lookup,
            executed_totals,
            results,
            ..
        } = self;
        let opposing = match taker.side {
            Side::Buy => asks,
            Side::Sell => bids,
        };

        while remaining > 0 {
            let Some(level_price) = opposing.best_price() else {
                break;
            };
            if let Some(limit_price) = limit {
                let crosses = match taker.side {
                    Side::Buy => level_price <= limit_price,
                    Side::Sell => level_price >= limit_price,
                };
                if !crosses {
                    break;
                }
            }

            let mut level_drained = false;
            if let Some(level) = opposing.level_mut(level_price) {
                let Some(maker) = level.front_mut() else {
                    break;
                };
                let maker_snapshot = maker.clone();
                let trade_quantity = remaining.min(maker.quantity);
                maker.quantity -= trade_quantity;
                let maker_remaining = maker.quantity;
                level.subtract_quantity(trade_quantity);
                remaining -= trade_quantity;

                let timestamp = clock.next(taker.timestamp);
                trace!(
                    taker = taker.order_id,
                    maker = maker_snapshot.order_id,
                    quantity = trade_quantity,
                    price = %level_price,
                    "trade"
                );

                // Taker leg first.
                let mut taker_event = template.clone();
                taker_event.timestamp = timestamp;
                taker_event.action = taker.action;
                taker_event.quantity = remaining;
                taker_event.executed_quantity = trade_quantity;
                taker_event.execution_price = level_price;
                taker_event.counterparty_id = maker_snapshot.order_id;
                taker_event.status = Some(if remaining == 0 {
                    OrderStatus::Executed
                } else {
                    OrderStatus::PartiallyExecuted
                });
                results.push(taker_event);
                *executed_totals.entry(taker.order_id).or_insert(0) += trade_quantity;

                // Maker leg mirrors it.
                let maker_id = maker_snapshot.order_id;
                let mut maker_event = maker_snapshot;
                maker_event.timestamp = timestamp;
                maker_event.quantity = maker_remaining;
                maker_event.executed_quantity = trade_quantity;
                maker_event.execution_price = level_price;
                maker_event.counterparty_id = taker.order_id;
                maker_event.status = Some(if maker_remaining == 0 {
                    OrderStatus::Executed
                } else {
                    OrderStatus::PartiallyExecuted
                });
                results.push(maker_event);
                *executed_totals.entry(maker_id).or_insert(0) += trade_quantity;

                if maker_remaining == 0 {
                    order_lookup.remove(&maker_id);
                    level.pop_front();
                }
                level_drained = level.is_empty();
            }
            if level_drained {
                opposing.remove_level(level_price);
            }
        }

        remaining
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Clone of the lookup's latest state for the taker; emitted events start
    /// from this and overwrite the per-event fields.
    fn taker_template(&self, order: &OrderRecord) -> OrderRecord {
        self.order_lookup
            .get(&order.order_id)
            .cloned()
            .unwrap_or_else(|| order.clone())
    }

    /// Pull an order off its side, using the lookup's price to find the
    /// level. Empty levels disappear with it.
    fn remove_resting(&mut self, existing: &OrderRecord) {
        let side = match existing.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        side.remove_order(existing.order_id, existing.price);
    }
}
