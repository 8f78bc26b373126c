use std::fmt::Debug;

use log::*;

use crate::{
    db_types::ItemWorkUnit,
    pipeline::BatchSummary,
    queue::{BatchPolicy, Delivery, QueueError, WorkQueue},
    traits::{InventoryManagement, StockUpdateOutcome},
};

/// The stock updater stage: a batch consumer of the item-processing queue.
///
/// Each work unit is applied as a single conditional decrement inside one store transaction. Insufficient stock is
/// not an error: the update is skipped and logged, and the message is acked. The submitter received its 200 long
/// before stock was known, and there is no side channel back to them.
pub struct StockUpdater<B, Q> {
    db: B,
    item_queue: Q,
}

impl<B, Q> Debug for StockUpdater<B, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StockUpdater")
    }
}

impl<B, Q> StockUpdater<B, Q>
where
    B: InventoryManagement,
    Q: WorkQueue<ItemWorkUnit>,
{
    pub fn new(db: B, item_queue: Q) -> Self {
        Self { db, item_queue }
    }

    /// Receives one batch from the item queue and processes it.
    pub async fn poll_once(&self, policy: BatchPolicy) -> Result<BatchSummary, QueueError> {
        let batch = self.item_queue.receive(policy).await?;
        Ok(self.process_batch(batch).await)
    }

    /// Processes each work unit independently; failures are logged and left for redrive.
    pub async fn process_batch(&self, batch: Vec<Delivery<ItemWorkUnit>>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for delivery in batch {
            let Delivery { message_id, body: unit, .. } = delivery;
            match self.db.apply_stock_delta(message_id, &unit).await {
                Ok(outcome) => {
                    match outcome {
                        StockUpdateOutcome::Updated { new_quantity } => {
                            debug!(
                                "📦️ Item {} stock decremented by {}; {new_quantity} remaining",
                                unit.id, unit.quantity
                            );
                            summary.processed += 1;
                        },
                        StockUpdateOutcome::InsufficientStock { available } => {
                            info!(
                                "📦️ Item {} has insufficient stock ({available} available, {} requested). Update \
                                 skipped.",
                                unit.id, unit.quantity
                            );
                            summary.processed += 1;
                        },
                        StockUpdateOutcome::ItemNotFound => {
                            warn!("📦️ No inventory row for item {}. Update skipped.", unit.id);
                            summary.processed += 1;
                        },
                        StockUpdateOutcome::DuplicateDelivery => {
                            debug!("📦️ Message {message_id} for item {} already applied", unit.id);
                            summary.duplicates += 1;
                        },
                    }
                    if let Err(e) = self.item_queue.ack(message_id).await {
                        warn!("📦️ Could not ack item message {message_id}. {e}");
                    }
                },
                Err(e) => {
                    error!("📦️ Error applying stock delta for item {} (message {message_id}). It will be \
                            redelivered. {e}", unit.id);
                    summary.failed += 1;
                },
            }
        }
        summary
    }
}
