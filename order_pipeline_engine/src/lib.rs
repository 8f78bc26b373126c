//! Order Pipeline Engine
//!
//! The engine contains the core logic for the asynchronous order pipeline: orders accepted at the HTTP front door
//! are enqueued, fanned out into per-item work units, persisted to a relational store, and inventory is decremented
//! per item. It is server-agnostic; the HTTP layer lives in the `order_pipeline_server` crate.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly. Instead, use the storage traits in [`mod@traits`] and the pipeline APIs. The
//!    exception is the data types used in the database. These are defined in the `db_types` module and are public.
//! 2. A generic at-least-once work queue primitive ([`mod@queue`]). Messages are delivered in bounded batches, may
//!    be delivered more than once, and only disappear once a consumer acknowledges them.
//! 3. The pipeline stages ([`mod@pipeline`]): order intake, the order expander and the stock updater. Each stage is
//!    a batch consumer that isolates per-message failures so that one bad message never stalls its siblings.
pub mod db_types;
pub mod pipeline;
pub mod queue;
pub mod traits;

mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use pipeline::{BatchSummary, IntakeApi, OrderExpander, PipelineError, StockUpdater};
pub use sqlite::SqliteDatabase;
