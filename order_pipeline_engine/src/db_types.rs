use std::collections::HashMap;

use blake2::{Blake2b512, Digest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use thiserror::Error;

/// The status a new order record is created with. The pipeline never transitions orders out of this state; a
/// fulfilment service downstream of this repository owns later transitions.
pub const PENDING_STATUS: &str = "Pending";

//--------------------------------------      OrderItem       ---------------------------------------------------------
/// One line item in a submitted order, keyed by item identifier in the `orderItems` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub quantity: i64,
}

//--------------------------------------     ItemWorkUnit     ---------------------------------------------------------
/// One unit of stock-processing work, extracted from an order by the order expander. Work units only ever exist as
/// queue messages; they are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWorkUnit {
    pub id: String,
    pub quantity: i64,
}

impl From<&OrderItem> for ItemWorkUnit {
    fn from(item: &OrderItem) -> Self {
        Self { id: item.id.clone(), quantity: item.quantity }
    }
}

//--------------------------------------       NewOrder       ---------------------------------------------------------
/// A validated order submission. This is the intake queue message body, carried verbatim from the HTTP request.
///
/// `order_id` is assigned by the caller and is *not* guaranteed unique; the persisted record gets its own
/// server-assigned key. An order is immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_id: i64,
    pub customer_id: i64,
    /// The order date as supplied by the caller. Carried opaquely; the persisted record uses the insert timestamp.
    pub order_date: String,
    pub amount: i64,
    #[serde(rename = "orderItems")]
    pub order_items: HashMap<String, OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("Bad request: payload must be a JSON object.")]
    NotAnObject,
    #[error("Bad request: Missing required fields. [{0}]")]
    MissingField(&'static str),
    #[error("Bad request: orderItems must be a non-empty object.")]
    EmptyItems,
    #[error("Bad request: Each item must have an id and a positive quantity. [{0}]")]
    InvalidItem(String),
}

impl NewOrder {
    /// Validates a raw JSON payload against the order shape and returns the structured order.
    ///
    /// Every gate here is a hard gate: `order_id`, `customer_id`, `order_date` and `amount` must all be present,
    /// `orderItems` must be a non-empty object, and every entry must carry an `id` and a positive `quantity`.
    pub fn try_from_value(value: &Value) -> Result<Self, OrderValidationError> {
        let body = value.as_object().ok_or(OrderValidationError::NotAnObject)?;
        let order_id = require_integer(body, "order_id")?;
        let customer_id = require_integer(body, "customer_id")?;
        let order_date = body
            .get("order_date")
            .and_then(Value::as_str)
            .ok_or(OrderValidationError::MissingField("order_date"))?
            .to_string();
        let amount = require_integer(body, "amount")?;
        let items = body
            .get("orderItems")
            .and_then(Value::as_object)
            .ok_or(OrderValidationError::MissingField("orderItems"))?;
        if items.is_empty() {
            return Err(OrderValidationError::EmptyItems);
        }
        let mut order_items = HashMap::with_capacity(items.len());
        for (key, entry) in items {
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| OrderValidationError::InvalidItem(key.clone()))?;
            let quantity = entry
                .get("quantity")
                .and_then(Value::as_i64)
                .filter(|q| *q > 0)
                .ok_or_else(|| OrderValidationError::InvalidItem(key.clone()))?;
            order_items.insert(key.clone(), OrderItem { id: id.to_string(), quantity });
        }
        Ok(Self { order_id, customer_id, order_date, amount, order_items })
    }

    /// A stable key identifying this order submission by content. Redelivered (or client-retried) copies of the
    /// same logical order hash to the same key, which the order store uses for its insert-if-absent contract.
    pub fn idempotency_key(&self) -> String {
        let mut hasher = Blake2b512::new();
        hasher.update(self.order_id.to_le_bytes());
        hasher.update(self.customer_id.to_le_bytes());
        hasher.update(self.order_date.as_bytes());
        hasher.update(self.amount.to_le_bytes());
        let mut keys = self.order_items.keys().collect::<Vec<_>>();
        keys.sort();
        for key in keys {
            let item = &self.order_items[key];
            hasher.update(key.as_bytes());
            hasher.update(item.id.as_bytes());
            hasher.update(item.quantity.to_le_bytes());
        }
        hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The serialized `orderItems` mapping, as stored in the order record.
    pub fn serialized_items(&self) -> String {
        serde_json::to_string(&self.order_items).unwrap_or_else(|_| "{}".to_string())
    }
}

fn require_integer(
    body: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<i64, OrderValidationError> {
    body.get(field).and_then(Value::as_i64).ok_or(OrderValidationError::MissingField(field))
}

//--------------------------------------  CustomerOrderRecord  --------------------------------------------------------
/// A persisted order row. `order_id` here is the server-assigned primary key, distinct from the caller-supplied
/// `order_id` in the submitted message. Written once by the order expander; never updated or deleted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CustomerOrderRecord {
    pub order_id: i64,
    pub customer_id: i64,
    /// Server-assigned timestamp at insert time.
    pub order_date: DateTime<Utc>,
    /// The order's item mapping, serialized as JSON.
    #[serde(rename = "orderItems")]
    pub order_items: String,
    pub status: String,
    pub amount: i64,
}

//--------------------------------------     InventoryItem     --------------------------------------------------------
/// A row in the inventory store. `quantity` is only ever reduced through validated, conditional deltas and is never
/// driven below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub description: Option<String>,
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn valid_payload() -> Value {
        json!({
            "order_id": 1,
            "customer_id": 42,
            "order_date": "2024-01-01",
            "amount": 100,
            "orderItems": { "a": { "id": "a", "quantity": 2 } }
        })
    }

    #[test]
    fn valid_order_parses() {
        let order = NewOrder::try_from_value(&valid_payload()).unwrap();
        assert_eq!(order.order_id, 1);
        assert_eq!(order.customer_id, 42);
        assert_eq!(order.amount, 100);
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.order_items["a"], OrderItem { id: "a".into(), quantity: 2 });
    }

    #[test]
    fn missing_fields_are_rejected() {
        for field in ["order_id", "customer_id", "order_date", "amount", "orderItems"] {
            let mut payload = valid_payload();
            payload.as_object_mut().unwrap().remove(field);
            let err = NewOrder::try_from_value(&payload).unwrap_err();
            assert_eq!(err, OrderValidationError::MissingField(field), "field: {field}");
        }
    }

    #[test]
    fn empty_item_map_is_rejected() {
        let mut payload = valid_payload();
        payload["orderItems"] = json!({});
        assert_eq!(NewOrder::try_from_value(&payload).unwrap_err(), OrderValidationError::EmptyItems);
    }

    #[test]
    fn items_need_an_id_and_a_positive_quantity() {
        let mut payload = valid_payload();
        payload["orderItems"] = json!({ "a": { "id": "a" } });
        assert_eq!(NewOrder::try_from_value(&payload).unwrap_err(), OrderValidationError::InvalidItem("a".into()));
        payload["orderItems"] = json!({ "a": { "quantity": 2 } });
        assert_eq!(NewOrder::try_from_value(&payload).unwrap_err(), OrderValidationError::InvalidItem("a".into()));
        payload["orderItems"] = json!({ "a": { "id": "a", "quantity": 0 } });
        assert_eq!(NewOrder::try_from_value(&payload).unwrap_err(), OrderValidationError::InvalidItem("a".into()));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(NewOrder::try_from_value(&json!([1, 2])).unwrap_err(), OrderValidationError::NotAnObject);
    }

    #[test]
    fn idempotency_key_is_stable_by_content() {
        let a = NewOrder::try_from_value(&valid_payload()).unwrap();
        let b = NewOrder::try_from_value(&valid_payload()).unwrap();
        assert_eq!(a.idempotency_key(), b.idempotency_key());
        let mut c = a.clone();
        c.amount += 1;
        assert_ne!(a.idempotency_key(), c.idempotency_key());
    }

    #[test]
    fn order_round_trips_verbatim() {
        let order = NewOrder::try_from_value(&valid_payload()).unwrap();
        let serialized = serde_json::to_value(&order).unwrap();
        assert_eq!(serialized, valid_payload());
    }
}
