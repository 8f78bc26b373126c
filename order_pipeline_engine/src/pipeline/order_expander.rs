use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{ItemWorkUnit, NewOrder},
    pipeline::{BatchSummary, PipelineError},
    queue::{BatchPolicy, Delivery, QueueError, WorkQueue},
    traits::OrderManagement,
};

/// The order expander stage: a batch consumer of the intake queue.
///
/// For each message the expander persists the order record first and derives the item fan-out from that insert:
/// only the call that actually created the row publishes work units. A redelivered (or client-retried) order
/// message therefore produces neither a second record nor a second fan-out. If a worker dies between the insert and
/// the publishes, the redelivery is treated as a duplicate and the missing work units are not re-emitted; that gap
/// is reconciled operationally (see DESIGN.md) rather than by double-publishing on every redrive.
pub struct OrderExpander<B, IQ, WQ> {
    db: B,
    intake_queue: IQ,
    item_queue: WQ,
}

impl<B, IQ, WQ> Debug for OrderExpander<B, IQ, WQ> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderExpander")
    }
}

impl<B, IQ, WQ> OrderExpander<B, IQ, WQ>
where
    B: OrderManagement,
    IQ: WorkQueue<NewOrder>,
    WQ: WorkQueue<ItemWorkUnit>,
{
    pub fn new(db: B, intake_queue: IQ, item_queue: WQ) -> Self {
        Self { db, intake_queue, item_queue }
    }

    /// Receives one batch from the intake queue and processes it. Returns the batch accounting; an empty batch is
    /// a normal outcome when the queue is idle.
    pub async fn poll_once(&self, policy: BatchPolicy) -> Result<BatchSummary, QueueError> {
        let batch = self.intake_queue.receive(policy).await?;
        Ok(self.process_batch(batch).await)
    }

    /// Processes each message in the batch independently. A failed message is logged and left unacked so the queue
    /// redelivers it; its siblings are unaffected.
    pub async fn process_batch(&self, batch: Vec<Delivery<NewOrder>>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for delivery in batch {
            let message_id = delivery.message_id;
            match self.expand_order(&delivery.body).await {
                Ok(inserted) => {
                    if inserted {
                        summary.processed += 1;
                    } else {
                        debug!("🛒️ Message {message_id} is a duplicate submission; fan-out skipped");
                        summary.duplicates += 1;
                    }
                    if let Err(e) = self.intake_queue.ack(message_id).await {
                        warn!("🛒️ Could not ack intake message {message_id}. {e}");
                    }
                },
                Err(e) => {
                    error!("🛒️ Error expanding order message {message_id}. It will be redelivered. {e}");
                    summary.failed += 1;
                },
            }
        }
        summary
    }

    /// Persists the order record and, iff the record was newly created, publishes one work unit per line item.
    /// Returns whether this call created the record.
    async fn expand_order(&self, order: &NewOrder) -> Result<bool, PipelineError> {
        let (record, inserted) = self.db.insert_order(order).await?;
        if !inserted {
            return Ok(false);
        }
        for (key, item) in &order.order_items {
            let unit = ItemWorkUnit::from(item);
            let message_id = self.item_queue.send(unit).await?;
            trace!("🛒️ Item {key} queued for stock processing as message {message_id}");
        }
        info!(
            "🛒️ Order recorded with id {} for customer {}; {} item(s) fanned out",
            record.order_id,
            record.customer_id,
            order.order_items.len()
        );
        Ok(true)
    }
}
