use thiserror::Error;

use crate::{
    db_types::OrderValidationError,
    queue::QueueError,
    traits::{InventoryError, OrderStoreError},
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    ValidationError(#[from] OrderValidationError),
    #[error("Queue error. {0}")]
    QueueError(#[from] QueueError),
    #[error("Order store error. {0}")]
    OrderStoreError(#[from] OrderStoreError),
    #[error("Inventory store error. {0}")]
    InventoryError(#[from] InventoryError),
}
