use std::fmt::Debug;

use log::*;
use serde_json::Value;

use crate::{db_types::NewOrder, pipeline::PipelineError, queue::WorkQueue};

/// The order intake stage. Validates a raw submission and enqueues it verbatim onto the intake queue.
///
/// This stage performs no datastore access and makes exactly one enqueue attempt per accepted order. It offers no
/// idempotency of its own: a retried client request produces a second queue message, and it is the order expander's
/// content-keyed insert that collapses the duplicates downstream.
pub struct IntakeApi<Q> {
    queue: Q,
}

impl<Q> Debug for IntakeApi<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IntakeApi")
    }
}

impl<Q> IntakeApi<Q>
where Q: WorkQueue<NewOrder>
{
    pub fn new(queue: Q) -> Self {
        Self { queue }
    }

    /// Validates the payload against the order shape and, if every gate passes, enqueues the order. Nothing is
    /// enqueued on any validation failure.
    pub async fn submit_order(&self, payload: &Value) -> Result<NewOrder, PipelineError> {
        let order = NewOrder::try_from_value(payload)?;
        let message_id = self.queue.send(order.clone()).await?;
        debug!(
            "📨️ Order {} for customer {} accepted and enqueued as message {message_id}",
            order.order_id, order.customer_id
        );
        Ok(order)
    }
}
