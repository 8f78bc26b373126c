use log::trace;
use sqlx::SqliteConnection;

use crate::{db_types::InventoryItem, traits::InventoryError};

pub async fn fetch_item(
    item_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<InventoryItem>, InventoryError> {
    let item = sqlx::query_as(
        "SELECT item_id, name, quantity, unit_price, description FROM inventory WHERE item_id = $1",
    )
    .bind(item_id)
    .fetch_optional(conn)
    .await?;
    Ok(item)
}

pub async fn upsert_item(item: &InventoryItem, conn: &mut SqliteConnection) -> Result<(), InventoryError> {
    sqlx::query(
        r#"
            INSERT INTO inventory (item_id, name, quantity, unit_price, description)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (item_id) DO UPDATE SET
                name = excluded.name,
                quantity = excluded.quantity,
                unit_price = excluded.unit_price,
                description = excluded.description;
        "#,
    )
    .bind(&item.item_id)
    .bind(&item.name)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(&item.description)
    .execute(conn)
    .await?;
    Ok(())
}

/// Atomically decrements the item's stock iff at least `delta` units are available. Returns the new quantity, or
/// `None` when the row does not exist or holds insufficient stock. The condition lives in the statement itself, so
/// concurrent updaters for the same item cannot lose updates or drive the quantity negative.
pub async fn conditional_decrement(
    item_id: &str,
    delta: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<i64>, InventoryError> {
    let new_quantity: Option<(i64,)> = sqlx::query_as(
        "UPDATE inventory SET quantity = quantity - $1 WHERE item_id = $2 AND quantity >= $1 RETURNING quantity",
    )
    .bind(delta)
    .bind(item_id)
    .fetch_optional(conn)
    .await?;
    Ok(new_quantity.map(|(q,)| q))
}

/// Records an item-queue message id in the processed set. Returns `false` when the id was already present, i.e.
/// when this delivery is a duplicate.
pub async fn mark_message_processed(
    message_id: i64,
    item_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, InventoryError> {
    let result = sqlx::query(
        "INSERT INTO processed_item_messages (message_id, item_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(message_id)
    .bind(item_id)
    .execute(conn)
    .await?;
    let first_time = result.rows_affected() == 1;
    trace!("📦️ message {message_id} for item {item_id} {}", if first_time { "recorded" } else { "already seen" });
    Ok(first_time)
}
