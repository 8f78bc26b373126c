//! A small, generic at-least-once work queue.
//!
//! The pipeline stages communicate through queues with the same delivery contract as a typical managed queue
//! service: messages are delivered in bounded batches, each delivery carries a stable message id, a message that is
//! not acknowledged becomes deliverable again after a visibility timeout, and there is no ordering or deduplication
//! guarantee across messages. Consumers must therefore tolerate duplicate delivery of the same logical message.
//!
//! This is deliberately not a broker. It is one fixed primitive, just capable enough to carry the
//! submit → expand-items → apply-stock-delta pipeline and to reproduce its failure semantics in tests.
mod memory;

use std::time::Duration;

use thiserror::Error;

pub use memory::MemoryQueue;

/// Identifies a delivery's underlying message. Ids are drawn at random per message, so they stay unique across
/// process restarts. Redeliveries of the same message carry the same id, which is what lets consumers keep a
/// persistent processed-message set.
pub type MessageId = u64;

/// One received message. Dropping a delivery without calling [`WorkQueue::ack`] returns the message to the queue
/// once its visibility timeout lapses.
#[derive(Debug, Clone)]
pub struct Delivery<T> {
    pub message_id: MessageId,
    /// How many times this message has been delivered, including this delivery.
    pub delivery_count: u32,
    pub body: T,
}

/// Delivery-policy parameters for batch consumers. These are knobs of the queue contract, not pipeline logic.
#[derive(Debug, Clone, Copy)]
pub struct BatchPolicy {
    /// Maximum number of messages handed to the consumer per activation.
    pub max_messages: usize,
    /// How long a receive call may wait for the first message before returning an empty batch.
    pub max_wait: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self { max_messages: 10, max_wait: Duration::from_secs(20) }
    }
}

#[derive(Debug, Clone, Error)]
pub enum QueueError {
    #[error("Message {0} is not in flight on queue '{1}'")]
    NotInFlight(MessageId, String),
}

/// The queue contract shared by the intake and item-processing queues.
///
/// Implementations promise at-least-once delivery: every sent message is delivered one or more times, never zero.
/// They promise nothing about ordering.
#[allow(async_fn_in_trait)]
pub trait WorkQueue<T>: Send + Sync
where T: Clone + Send
{
    /// Enqueue a message. Returns the id the message will carry on every delivery.
    async fn send(&self, body: T) -> Result<MessageId, QueueError>;

    /// Receive a batch of up to `policy.max_messages` messages, waiting up to `policy.max_wait` for the first one.
    /// Received messages stay invisible to other consumers until their visibility timeout lapses or they are acked.
    async fn receive(&self, policy: BatchPolicy) -> Result<Vec<Delivery<T>>, QueueError>;

    /// Acknowledge (and permanently remove) a delivered message.
    async fn ack(&self, message_id: MessageId) -> Result<(), QueueError>;

    /// Number of messages currently held by the queue, whether in flight or awaiting delivery.
    async fn pending_count(&self) -> usize;
}
