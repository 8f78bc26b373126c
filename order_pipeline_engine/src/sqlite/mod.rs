//! SQLite backend for the order pipeline.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
