use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{CustomerOrderRecord, NewOrder, PENDING_STATUS},
    traits::OrderStoreError,
};

/// Inserts the order record, returning `false` in the second parameter if an order with the same content key
/// already exists. Safe to call concurrently for the same order: the UNIQUE constraint on the idempotency key
/// arbitrates the race and the loser returns the winner's row.
pub async fn idempotent_insert(
    order: &NewOrder,
    conn: &mut SqliteConnection,
) -> Result<(CustomerOrderRecord, bool), OrderStoreError> {
    let key = order.idempotency_key();
    if let Some(existing) = fetch_order_by_key(&key, conn).await? {
        debug!("📝️ Order submission for customer {} already recorded as #{}", order.customer_id, existing.order_id);
        return Ok((existing, false));
    }
    match insert_order(order, &key, conn).await {
        Ok(record) => {
            debug!("📝️ Order for customer {} inserted with id {}", order.customer_id, record.order_id);
            Ok((record, true))
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            let existing = fetch_order_by_key(&key, conn)
                .await?
                .ok_or_else(|| OrderStoreError::DatabaseError("Order vanished after unique violation".into()))?;
            Ok((existing, false))
        },
        Err(e) => Err(e.into()),
    }
}

/// Inserts a new order record using the given connection. This is not atomic on its own. You can embed this call
/// inside a transaction if you need atomicity, and pass `&mut *tx` as the connection argument.
async fn insert_order(
    order: &NewOrder,
    idempotency_key: &str,
    conn: &mut SqliteConnection,
) -> Result<CustomerOrderRecord, sqlx::Error> {
    let record = sqlx::query_as(
        r#"
            INSERT INTO customer_orders (
                customer_id,
                order_date,
                order_items,
                status,
                amount,
                idempotency_key
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING order_id, customer_id, order_date, order_items, status, amount;
        "#,
    )
    .bind(order.customer_id)
    .bind(Utc::now())
    .bind(order.serialized_items())
    .bind(PENDING_STATUS)
    .bind(order.amount)
    .bind(idempotency_key)
    .fetch_one(conn)
    .await?;
    Ok(record)
}

async fn fetch_order_by_key(
    key: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<CustomerOrderRecord>, sqlx::Error> {
    let order = sqlx::query_as(
        "SELECT order_id, customer_id, order_date, order_items, status, amount FROM customer_orders WHERE \
         idempotency_key = $1",
    )
    .bind(key)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Returns all order records for the given customer, oldest first.
pub async fn fetch_orders_for_customer(
    customer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<CustomerOrderRecord>, OrderStoreError> {
    let orders = sqlx::query_as(
        "SELECT order_id, customer_id, order_date, order_items, status, amount FROM customer_orders WHERE \
         customer_id = $1 ORDER BY order_id ASC",
    )
    .bind(customer_id)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}
