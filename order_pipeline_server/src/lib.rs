//! # Order management server
//! This crate hosts the HTTP front end of the order management pipeline. It is responsible for:
//! * Authenticating callers via JWT bearer tokens.
//! * Accepting order submissions and placing them on the order intake queue.
//! * Serving order listings per customer.
//! * Running the background workers that drain the intake and item-processing queues.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /orders`: Accepts an order submission and enqueues it for processing.
//! * `GET /orders?customer_id=`: Lists the stored orders for a customer.

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;
pub mod workers;

#[cfg(test)]
mod endpoint_tests;
