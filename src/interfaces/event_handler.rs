// ============================================================================
// Event Handler Interface
// Defines the contract for observing emitted order events
// ============================================================================

use crate::domain::OrderRecord;

/// Observer for records as the engine appends them to a result log.
/// Implementations can handle logging, metrics, notifications, etc. The
/// result log itself stays authoritative; handlers see value copies.
pub trait EventHandler {
    /// Handle one emitted record
    fn on_record(&self, record: &OrderRecord);
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_record(&self, _record: &OrderRecord) {
        // Do nothing
    }
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_record(&self, record: &OrderRecord) {
        tracing::debug!(
            order_id = record.order_id,
            instrument = %record.instrument,
            action = %record.action,
            status = ?record.status,
            "engine event"
        );
    }
}
