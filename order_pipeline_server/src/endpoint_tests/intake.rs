use std::time::Duration;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Days, Utc};
use order_pipeline_engine::{
    db_types::NewOrder,
    queue::{BatchPolicy, MemoryQueue, WorkQueue},
    IntakeApi,
};
use serde_json::{json, Value};

use super::helpers::{issue_token, post_raw, post_request};
use crate::routes::submit_order;

fn intake_queue() -> MemoryQueue<NewOrder> {
    MemoryQueue::new("test-intake", Duration::from_secs(30))
}

fn configure(queue: MemoryQueue<NewOrder>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(IntakeApi::new(queue)))
            .route("/orders", web::post().to(submit_order::<MemoryQueue<NewOrder>>));
    }
}

fn order_payload() -> Value {
    json!({
        "order_id": 1,
        "customer_id": 42,
        "order_date": "2024-01-01",
        "amount": 100,
        "orderItems": { "a": { "id": "a", "quantity": 2 } }
    })
}

fn valid_token() -> String {
    issue_token("customer-42", Utc::now() + Days::new(1))
}

#[actix_web::test]
async fn valid_order_is_accepted_and_enqueued() {
    let queue = intake_queue();
    let (status, body) = post_request(&valid_token(), "/orders", order_payload(), configure(queue.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order received successfully.");
    assert_eq!(queue.pending_count().await, 1);
    // The queue message is the submitted order, verbatim.
    let batch = queue.receive(BatchPolicy { max_messages: 1, max_wait: Duration::from_millis(10) }).await.unwrap();
    assert_eq!(batch[0].body, NewOrder::try_from_value(&order_payload()).unwrap());
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let queue = intake_queue();
    let (status, body) = post_request("", "/orders", order_payload(), configure(queue.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token provided.");
    assert_eq!(queue.pending_count().await, 0);
}

#[actix_web::test]
async fn tampered_token_is_forbidden() {
    let queue = intake_queue();
    let mut token = valid_token();
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let (status, body) = post_request(&token, "/orders", order_payload(), configure(queue.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden: invalid or expired token.");
    assert_eq!(queue.pending_count().await, 0);
}

#[actix_web::test]
async fn expired_token_is_forbidden() {
    let queue = intake_queue();
    let token = issue_token("customer-42", Utc::now() - Days::new(1));
    let (status, body) = post_request(&token, "/orders", order_payload(), configure(queue.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden: invalid or expired token.");
    assert_eq!(queue.pending_count().await, 0);
}

#[actix_web::test]
async fn missing_required_field_is_a_bad_request() {
    for field in ["order_id", "customer_id", "order_date", "amount"] {
        let queue = intake_queue();
        let mut payload = order_payload();
        payload.as_object_mut().unwrap().remove(field);
        let (status, body) = post_request(&valid_token(), "/orders", payload, configure(queue.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field: {field}");
        assert_eq!(body["message"], format!("Bad request: Missing required fields. [{field}]"));
        assert_eq!(queue.pending_count().await, 0, "field: {field}");
    }
}

#[actix_web::test]
async fn empty_items_are_rejected() {
    let queue = intake_queue();
    let mut payload = order_payload();
    payload["orderItems"] = json!({});
    let (status, body) = post_request(&valid_token(), "/orders", payload, configure(queue.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bad request: orderItems must be a non-empty object.");
    assert_eq!(queue.pending_count().await, 0);
}

#[actix_web::test]
async fn item_without_positive_quantity_is_rejected() {
    let queue = intake_queue();
    let mut payload = order_payload();
    payload["orderItems"]["a"]["quantity"] = json!(0);
    let (status, body) = post_request(&valid_token(), "/orders", payload, configure(queue.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bad request: Each item must have an id and a positive quantity. [a]");
    assert_eq!(queue.pending_count().await, 0);
}

#[actix_web::test]
async fn garbage_body_is_a_bad_request() {
    let queue = intake_queue();
    let (status, body) = post_raw(&valid_token(), "/orders", "not json".to_string(), configure(queue.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bad request: Invalid JSON in the payload.");
    assert_eq!(queue.pending_count().await, 0);
}
