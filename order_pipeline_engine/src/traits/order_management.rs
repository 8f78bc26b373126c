use thiserror::Error;

use crate::db_types::{CustomerOrderRecord, NewOrder};

#[derive(Debug, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// Behaviour of the order store.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Send + Sync {
    /// Persist a new order record with `status = "Pending"` and a server-assigned timestamp.
    ///
    /// The insert is idempotent on the order's content key ([`NewOrder::idempotency_key`]): inserting the same
    /// logical order twice returns the existing record. The boolean in the result is `true` iff this call created
    /// the row.
    async fn insert_order(&self, order: &NewOrder) -> Result<(CustomerOrderRecord, bool), OrderStoreError>;

    /// All order records for the given customer, oldest first.
    async fn fetch_orders_for_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<CustomerOrderRecord>, OrderStoreError>;
}
