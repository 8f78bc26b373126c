//! Background consumers for the two queues.
//!
//! Each worker is a detached tokio task that polls its queue in batches forever. A receive error is logged and
//! retried after a short pause rather than killing the task; per-message failures are already absorbed inside
//! `poll_once` and surface only in the batch summary.
use std::time::Duration;

use log::*;
use order_pipeline_engine::{
    db_types::{ItemWorkUnit, NewOrder},
    queue::{BatchPolicy, MemoryQueue},
    OrderExpander,
    SqliteDatabase,
    StockUpdater,
};
use tokio::task::JoinHandle;

const RECEIVE_RETRY_DELAY: Duration = Duration::from_secs(1);

pub fn start_order_expander(
    db: SqliteDatabase,
    intake_queue: MemoryQueue<NewOrder>,
    item_queue: MemoryQueue<ItemWorkUnit>,
    policy: BatchPolicy,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("🛒️ Order expander worker started");
        let expander = OrderExpander::new(db, intake_queue, item_queue);
        loop {
            match expander.poll_once(policy).await {
                Ok(summary) if summary.total() > 0 => info!("🛒️ Intake batch done. {summary}"),
                Ok(_) => trace!("🛒️ Intake queue is idle"),
                Err(e) => {
                    error!("🛒️ Could not receive from the intake queue. {e}");
                    tokio::time::sleep(RECEIVE_RETRY_DELAY).await;
                },
            }
        }
    })
}

pub fn start_stock_updater(
    db: SqliteDatabase,
    item_queue: MemoryQueue<ItemWorkUnit>,
    policy: BatchPolicy,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("📦️ Stock updater worker started");
        let updater = StockUpdater::new(db, item_queue);
        loop {
            match updater.poll_once(policy).await {
                Ok(summary) if summary.total() > 0 => info!("📦️ Item batch done. {summary}"),
                Ok(_) => trace!("📦️ Item queue is idle"),
                Err(e) => {
                    error!("📦️ Could not receive from the item queue. {e}");
                    tokio::time::sleep(RECEIVE_RETRY_DELAY).await;
                },
            }
        }
    })
}
