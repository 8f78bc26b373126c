//! `SqliteDatabase` is the concrete storage backend for the order pipeline.
//!
//! Unsurprisingly, it uses SQLite and implements both storage traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, migrate::MigrateError, SqlitePool};

use super::db::{inventory, new_pool, orders};
use crate::{
    db_types::{CustomerOrderRecord, InventoryItem, ItemWorkUnit, NewOrder},
    queue::MessageId,
    traits::{InventoryError, InventoryManagement, OrderManagement, OrderStoreError, StockUpdateOutcome},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool against the given database URL.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies the embedded schema migrations. Called once at process start.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    /// Runs inside an explicit transaction: the row must be committed before this returns, since readers come in on
    /// sibling pool connections.
    async fn insert_order(&self, order: &NewOrder) -> Result<(CustomerOrderRecord, bool), OrderStoreError> {
        let mut tx = self.pool.begin().await.map_err(OrderStoreError::from)?;
        let (record, inserted) = orders::idempotent_insert(order, &mut tx).await?;
        tx.commit().await.map_err(OrderStoreError::from)?;
        if inserted {
            debug!(
                "🗃️ Order for customer {} has been saved in the DB with id {}",
                record.customer_id, record.order_id
            );
        }
        Ok((record, inserted))
    }

    async fn fetch_orders_for_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<CustomerOrderRecord>, OrderStoreError> {
        let mut conn = self.pool.acquire().await.map_err(OrderStoreError::from)?;
        orders::fetch_orders_for_customer(customer_id, &mut conn).await
    }
}

impl InventoryManagement for SqliteDatabase {
    async fn fetch_item(&self, item_id: &str) -> Result<Option<InventoryItem>, InventoryError> {
        let mut conn = self.pool.acquire().await.map_err(InventoryError::from)?;
        inventory::fetch_item(item_id, &mut conn).await
    }

    async fn upsert_item(&self, item: &InventoryItem) -> Result<(), InventoryError> {
        let mut conn = self.pool.acquire().await.map_err(InventoryError::from)?;
        inventory::upsert_item(item, &mut conn).await
    }

    /// In a single transaction: record the message id (insert-if-absent), then apply the conditional decrement.
    /// A redelivered message trips the first step and leaves the inventory untouched.
    async fn apply_stock_delta(
        &self,
        message_id: MessageId,
        unit: &ItemWorkUnit,
    ) -> Result<StockUpdateOutcome, InventoryError> {
        let mut tx = self.pool.begin().await.map_err(InventoryError::from)?;
        #[allow(clippy::cast_possible_wrap)]
        let first_time = inventory::mark_message_processed(message_id as i64, &unit.id, &mut tx).await?;
        if !first_time {
            tx.rollback().await.map_err(InventoryError::from)?;
            return Ok(StockUpdateOutcome::DuplicateDelivery);
        }
        let outcome = match inventory::conditional_decrement(&unit.id, unit.quantity, &mut tx).await? {
            Some(new_quantity) => StockUpdateOutcome::Updated { new_quantity },
            None => match inventory::fetch_item(&unit.id, &mut tx).await? {
                Some(item) => StockUpdateOutcome::InsufficientStock { available: item.quantity },
                None => StockUpdateOutcome::ItemNotFound,
            },
        };
        tx.commit().await.map_err(InventoryError::from)?;
        Ok(outcome)
    }
}
