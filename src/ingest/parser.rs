// ============================================================================
// CSV Parsing
// Reads instruction files into order records and writes the event stream back
// ============================================================================

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use tracing::warn;

use super::validator::{self, ValidationError};
use crate::domain::{OrderAction, OrderRecord, OrderStatus, OrderType, Side};
use crate::numeric::Price;

/// Column layout shared by input and output files.
pub const OUTPUT_HEADER: &str = "timestamp,order_id,instrument,side,type,quantity,price,action,\
                                 status,executed_quantity,execution_price,counterparty_id";

/// I/O failures while reading or writing an order file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

// ============================================================================
// Reading
// ============================================================================

/// Read an instruction file: one header line, then one instruction per line.
///
/// Blank lines are skipped. A line that fails parsing or validation still
/// yields a record, flagged Rejected with every parseable field preserved.
/// A NEW whose `order_id` already appeared on an earlier NEW in the stream is
/// flagged Rejected here, before the engine ever sees it.
pub fn read_orders(path: impl AsRef<Path>) -> Result<Vec<OrderRecord>, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut orders = Vec::new();
    let mut seen_new_ids: HashSet<u64> = HashSet::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IngestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if index == 0 {
            // Header
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let line_number = index + 1;
        let mut record = parse_line(&line, line_number);

        if !record.is_rejected() && record.action == OrderAction::New {
            if !seen_new_ids.insert(record.order_id) {
                warn!(
                    line = line_number,
                    order_id = record.order_id,
                    "duplicate NEW order id in input stream, rejecting"
                );
                record.status = Some(OrderStatus::Rejected);
            }
        }

        if record.order_id != 0 || record.is_rejected() {
            orders.push(record);
        }
    }

    Ok(orders)
}

/// Parse one CSV line into a record. Never fails: structural problems produce
/// a Rejected record carrying whatever fields did parse.
pub fn parse_line(line: &str, line_number: usize) -> OrderRecord {
    let fields: Vec<&str> = line.split(',').collect();

    if fields.len() != 8 {
        warn!(
            line = line_number,
            found = fields.len(),
            "expected 8 fields, rejecting"
        );
        return salvage_malformed(&fields);
    }

    let mut record = blank_record();
    let mut error: Option<ValidationError> = None;

    match fields[0].trim().parse::<u64>() {
        Ok(timestamp) => record.timestamp = timestamp,
        Err(_) => note(&mut error, ValidationError::InvalidTimestamp),
    }
    match fields[1].trim().parse::<u64>() {
        Ok(order_id) => record.order_id = order_id,
        Err(_) => note(&mut error, ValidationError::InvalidOrderId),
    }
    record.instrument = fields[2].trim().to_string();
    match fields[3].trim().parse::<Side>() {
        Ok(side) => record.side = side,
        Err(_) => note(&mut error, ValidationError::InvalidSide),
    }
    match fields[4].trim().parse::<OrderType>() {
        Ok(order_type) => record.order_type = order_type,
        Err(_) => note(&mut error, ValidationError::InvalidType),
    }
    match fields[5].trim().parse::<u64>() {
        Ok(quantity) => record.quantity = quantity,
        Err(_) => note(&mut error, ValidationError::InvalidQuantity),
    }
    match parse_price(fields[6]) {
        Some(price) => record.price = price,
        None => note(&mut error, ValidationError::InvalidPrice),
    }
    match fields[7].trim().parse::<OrderAction>() {
        Ok(action) => record.action = action,
        Err(_) => note(&mut error, ValidationError::InvalidAction),
    }

    if error.is_none() {
        error = validator::validate_record(&record).err();
    }

    if let Some(reason) = error {
        warn!(line = line_number, %reason, "rejecting order");
        record.status = Some(OrderStatus::Rejected);
    }

    record
}

/// Prices arrive as free-form decimals; they are normalized onto the
/// two-digit grid (round half away from zero) before entering the book.
fn parse_price(field: &str) -> Option<Price> {
    let decimal: Decimal = field.trim().parse().ok()?;
    let rounded = decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Price::from_decimal(rounded).ok()
}

/// Best-effort recovery for lines with the wrong field count: keep whatever
/// prefix parses so the rejection echo is as informative as the line allows.
fn salvage_malformed(fields: &[&str]) -> OrderRecord {
    let mut record = blank_record();

    if let Some(field) = fields.first() {
        if let Ok(timestamp) = field.trim().parse() {
            record.timestamp = timestamp;
        }
    }
    if let Some(field) = fields.get(1) {
        if let Ok(order_id) = field.trim().parse() {
            record.order_id = order_id;
        }
    }
    if let Some(field) = fields.get(2) {
        record.instrument = field.trim().to_string();
    }
    if let Some(field) = fields.get(3) {
        if let Ok(side) = field.trim().parse() {
            record.side = side;
        }
    }
    if let Some(field) = fields.get(4) {
        if let Ok(order_type) = field.trim().parse() {
            record.order_type = order_type;
        }
    }
    if let Some(field) = fields.get(5) {
        if let Ok(quantity) = field.trim().parse() {
            record.quantity = quantity;
        }
    }
    if let Some(field) = fields.get(6) {
        if let Some(price) = parse_price(field) {
            record.price = price;
        }
    }
    if let Some(field) = fields.get(7) {
        if let Ok(action) = field.trim().parse() {
            record.action = action;
        }
    }

    record.status = Some(OrderStatus::Rejected);
    record
}

/// Fields that never parse fall back to these defaults in rejection echoes.
fn blank_record() -> OrderRecord {
    OrderRecord::new(
        0,
        0,
        "",
        Side::Buy,
        OrderType::Limit,
        0,
        Price::ZERO,
        OrderAction::New,
    )
}

fn note(error: &mut Option<ValidationError>, reason: ValidationError) {
    if error.is_none() {
        *error = Some(reason);
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Write the drained event stream: the fixed header, then one line per
/// record with prices rendered to exactly two fractional digits.
pub fn write_output(path: impl AsRef<Path>, records: &[OrderRecord]) -> Result<(), IngestError> {
    let path = path.as_ref();
    let wrap = |source| IngestError::Write {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(wrap)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", OUTPUT_HEADER).map_err(wrap)?;
    for record in records {
        writeln!(writer, "{}", format_record(record)).map_err(wrap)?;
    }
    writer.flush().map_err(wrap)?;

    Ok(())
}

/// Render one record as an output line.
pub fn format_record(record: &OrderRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{}",
        record.timestamp,
        record.order_id,
        record.instrument,
        record.side,
        record.order_type,
        record.quantity,
        record.price,
        record.action,
        record.status.map(OrderStatus::as_str).unwrap_or(""),
        record.executed_quantity,
        record.execution_price,
        record.counterparty_id,
    )
}
