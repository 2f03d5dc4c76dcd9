// ============================================================================
// CLI Entry Point
// Batch-processes an instruction file into an event file
// ============================================================================

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use clob_engine::domain::OrderStatus;
use clob_engine::engine::MatchingEngine;
use clob_engine::ingest;

#[derive(Parser)]
#[command(name = "clob-engine")]
#[command(about = "Deterministic limit order book matcher for CSV instruction files")]
struct Cli {
    /// CSV file of order instructions
    input: PathBuf,
    /// Destination for the CSV event stream
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();
    let started = Instant::now();

    let orders = ingest::read_orders(&cli.input)?;
    info!(path = %cli.input.display(), count = orders.len(), "parsed input");

    let rejected_inputs = orders.iter().filter(|o| o.is_rejected()).count();
    if rejected_inputs > 0 {
        warn!(
            count = rejected_inputs,
            "input records rejected during validation"
        );
    }

    let order_count = orders.len();
    let mut engine = MatchingEngine::new();
    for order in orders {
        engine.process(order);
    }
    let results = engine.drain();
    info!(count = results.len(), "generated result records");

    ingest::write_output(&cli.output, &results)?;
    info!(path = %cli.output.display(), "output written");

    let elapsed = started.elapsed();
    let total_ms = elapsed.as_secs_f64() * 1_000.0;
    let per_order_us = if order_count > 0 {
        elapsed.as_secs_f64() * 1_000_000.0 / order_count as f64
    } else {
        0.0
    };
    info!(total_ms, per_order_us, "processing complete");

    let mut executed = 0usize;
    let mut partially_executed = 0usize;
    let mut pending = 0usize;
    let mut canceled = 0usize;
    let mut rejected = 0usize;
    for record in &results {
        match record.status {
            Some(OrderStatus::Executed) => executed += 1,
            Some(OrderStatus::PartiallyExecuted) => partially_executed += 1,
            Some(OrderStatus::Pending) => pending += 1,
            Some(OrderStatus::Canceled) => canceled += 1,
            Some(OrderStatus::Rejected) => rejected += 1,
            None => {}
        }
    }
    info!(
        executed,
        partially_executed, pending, canceled, rejected, "execution statistics"
    );

    Ok(())
}
