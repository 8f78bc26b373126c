use thiserror::Error;

use crate::{
    db_types::{InventoryItem, ItemWorkUnit},
    queue::MessageId,
};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for InventoryError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The result of applying one item work unit against the inventory store. None of these variants is an error; they
/// are the normal vocabulary of an at-least-once consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockUpdateOutcome {
    /// Stock was decremented. Carries the quantity remaining after the update.
    Updated { new_quantity: i64 },
    /// The item had too little stock for the requested delta. No write was performed.
    InsufficientStock { available: i64 },
    /// No inventory row exists for the work unit's item id.
    ItemNotFound,
    /// This queue message was already processed by an earlier delivery. No write was performed.
    DuplicateDelivery,
}

/// Behaviour of the inventory store.
#[allow(async_fn_in_trait)]
pub trait InventoryManagement: Send + Sync {
    async fn fetch_item(&self, item_id: &str) -> Result<Option<InventoryItem>, InventoryError>;

    /// Create or replace an inventory row. Used for stock administration and test seeding; the pipeline itself only
    /// ever decrements.
    async fn upsert_item(&self, item: &InventoryItem) -> Result<(), InventoryError>;

    /// Apply a work unit's stock delta in a single atomic transaction.
    ///
    /// The decrement is conditional (`quantity >= delta`), so concurrent updaters for the same item cannot lose
    /// updates or drive the quantity negative. The queue `message_id` is recorded in a processed-message set inside
    /// the same transaction, which makes redelivered messages no-ops.
    async fn apply_stock_delta(
        &self,
        message_id: MessageId,
        unit: &ItemWorkUnit,
    ) -> Result<StockUpdateOutcome, InventoryError>;
}
