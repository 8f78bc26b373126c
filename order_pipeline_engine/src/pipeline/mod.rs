//! # The order pipeline
//!
//! Three stages, connected by at-least-once queues:
//!
//! * [`IntakeApi`] validates a raw order submission and enqueues it verbatim on the intake queue.
//! * [`OrderExpander`] consumes intake batches: persists one order record per message and fans out one item work
//!   unit per line item onto the item-processing queue.
//! * [`StockUpdater`] consumes item batches and applies conditional stock decrements to the inventory store.
//!
//! The queues deliver at-least-once with no ordering, so both consumers are duplicate-safe: the expander's insert
//! is idempotent on the order's content key, and the stock updater keeps a processed-message-id set. Per-message
//! failures are logged and left unacked for redrive; they never abort sibling messages in the same batch.
mod errors;
mod intake_api;
mod order_expander;
mod stock_updater;

use std::fmt::Display;

pub use errors::PipelineError;
pub use intake_api::IntakeApi;
pub use order_expander::OrderExpander;
pub use stock_updater::StockUpdater;

/// Per-batch accounting returned by the consumer stages. Purely informational; the queue owns retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Messages processed to completion and acked.
    pub processed: usize,
    /// Messages recognised as duplicates of earlier deliveries, acked without side effects.
    pub duplicates: usize,
    /// Messages that failed and were left on the queue for redrive.
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed + self.duplicates + self.failed
    }
}

impl Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} processed, {} duplicates, {} failed", self.processed, self.duplicates, self.failed)
    }
}
