//! Storage contracts for the pipeline's two stores.
//!
//! The order store and the inventory store are each owned exclusively by one pipeline stage: the order expander is
//! the sole writer of order records, and the stock updater is the sole reader/writer of inventory rows. The traits
//! here define the behaviour a storage backend must expose for those stages (and for the read-only retrieval
//! endpoint). The SQLite backend in [`crate::SqliteDatabase`] implements both.
mod inventory_management;
mod order_management;

pub use inventory_management::{InventoryError, InventoryManagement, StockUpdateOutcome};
pub use order_management::{OrderManagement, OrderStoreError};
