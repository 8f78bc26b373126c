use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

use log::*;
use tokio::sync::Mutex;

use crate::queue::{BatchPolicy, Delivery, MessageId, QueueError, WorkQueue};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

struct Envelope<T> {
    message_id: MessageId,
    body: T,
    visible_at: Instant,
    delivery_count: u32,
}

struct Inner<T> {
    messages: VecDeque<Envelope<T>>,
}

/// An in-process [`WorkQueue`] with at-least-once semantics.
///
/// Messages received but not acked become deliverable again after `visibility_timeout`, with the same message id
/// and an incremented delivery count. This mirrors the redrive behaviour of the managed queues the pipeline is
/// designed against, and is what the redelivery tests lean on.
pub struct MemoryQueue<T> {
    name: String,
    visibility_timeout: Duration,
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for MemoryQueue<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            visibility_timeout: self.visibility_timeout,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> MemoryQueue<T> {
    pub fn new<S: Into<String>>(name: S, visibility_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            visibility_timeout,
            inner: Arc::new(Mutex::new(Inner { messages: VecDeque::new() })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> WorkQueue<T> for MemoryQueue<T>
where T: Clone + Send + Sync
{
    async fn send(&self, body: T) -> Result<MessageId, QueueError> {
        // Ids are random, not sequential. Consumers persist processed ids across restarts, so a fresh queue must
        // never mint an id an earlier queue already handed out.
        let message_id = rand::random::<MessageId>();
        let mut inner = self.inner.lock().await;
        inner.messages.push_back(Envelope { message_id, body, visible_at: Instant::now(), delivery_count: 0 });
        trace!("📮️ [{}] message {message_id} enqueued", self.name);
        Ok(message_id)
    }

    async fn receive(&self, policy: BatchPolicy) -> Result<Vec<Delivery<T>>, QueueError> {
        let deadline = Instant::now() + policy.max_wait;
        loop {
            let mut batch = Vec::new();
            {
                let mut inner = self.inner.lock().await;
                let now = Instant::now();
                for envelope in inner.messages.iter_mut() {
                    if batch.len() >= policy.max_messages {
                        break;
                    }
                    if envelope.visible_at > now {
                        continue;
                    }
                    envelope.visible_at = now + self.visibility_timeout;
                    envelope.delivery_count += 1;
                    if envelope.delivery_count > 1 {
                        debug!(
                            "📮️ [{}] message {} redelivered (delivery #{})",
                            self.name, envelope.message_id, envelope.delivery_count
                        );
                    }
                    batch.push(Delivery {
                        message_id: envelope.message_id,
                        delivery_count: envelope.delivery_count,
                        body: envelope.body.clone(),
                    });
                }
            }
            if !batch.is_empty() || Instant::now() >= deadline {
                return Ok(batch);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - Instant::now())).await;
        }
    }

    async fn ack(&self, message_id: MessageId) -> Result<(), QueueError> {
        let mut inner = self.inner.lock().await;
        let before = inner.messages.len();
        inner.messages.retain(|m| m.message_id != message_id);
        if inner.messages.len() == before {
            return Err(QueueError::NotInFlight(message_id, self.name.clone()));
        }
        trace!("📮️ [{}] message {message_id} acked", self.name);
        Ok(())
    }

    async fn pending_count(&self) -> usize {
        self.inner.lock().await.messages.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn queue() -> MemoryQueue<String> {
        MemoryQueue::new("test", Duration::from_millis(50))
    }

    fn policy(max: usize, wait_ms: u64) -> BatchPolicy {
        BatchPolicy { max_messages: max, max_wait: Duration::from_millis(wait_ms) }
    }

    #[tokio::test]
    async fn send_receive_ack() {
        let q = queue();
        let id = q.send("hello".to_string()).await.unwrap();
        let batch = q.receive(policy(10, 10)).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].message_id, id);
        assert_eq!(batch[0].body, "hello");
        assert_eq!(batch[0].delivery_count, 1);
        q.ack(id).await.unwrap();
        assert_eq!(q.pending_count().await, 0);
    }

    #[tokio::test]
    async fn unacked_messages_are_redelivered_with_the_same_id() {
        let q = queue();
        let id = q.send("again".to_string()).await.unwrap();
        let first = q.receive(policy(10, 10)).await.unwrap();
        assert_eq!(first.len(), 1);
        // No ack: invisible until the visibility timeout lapses, then redelivered.
        assert!(q.receive(policy(10, 10)).await.unwrap().is_empty());
        tokio::time::sleep(Duration::from_millis(60)).await;
        let second = q.receive(policy(10, 10)).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].message_id, id);
        assert_eq!(second[0].delivery_count, 2);
    }

    #[tokio::test]
    async fn batches_are_bounded() {
        let q = queue();
        for i in 0..15 {
            q.send(format!("m{i}")).await.unwrap();
        }
        let batch = q.receive(policy(10, 10)).await.unwrap();
        assert_eq!(batch.len(), 10);
        let rest = q.receive(policy(10, 10)).await.unwrap();
        assert_eq!(rest.len(), 5);
    }

    #[tokio::test]
    async fn receive_returns_empty_after_max_wait() {
        let q = queue();
        let start = Instant::now();
        let batch = q.receive(policy(10, 30)).await.unwrap();
        assert!(batch.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn message_ids_do_not_repeat_across_queue_instances() {
        // A consumer's processed-id set outlives the queue, so ids minted by a fresh queue must not collide with
        // ids an earlier queue handed out.
        let first = queue().send("one".to_string()).await.unwrap();
        let second = queue().send("one".to_string()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn acking_an_unknown_message_fails() {
        let q = queue();
        let err = q.ack(99).await.unwrap_err();
        assert!(matches!(err, QueueError::NotInFlight(99, _)));
    }
}
