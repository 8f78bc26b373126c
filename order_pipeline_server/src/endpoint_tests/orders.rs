use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Days, TimeZone, Utc};
use order_pipeline_engine::{
    db_types::{CustomerOrderRecord, PENDING_STATUS},
    traits::OrderStoreError,
};

use super::helpers::{get_request, issue_token};
use crate::{endpoint_tests::mocks::MockOrderStore, routes::customer_orders};

#[actix_web::test]
async fn fetch_orders_for_customer() {
    let token = valid_token();
    let (status, body) = get_request(&token, "/orders?customer_id=42", configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Success.");
    let data = body["data"].as_array().expect("data should be an array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["order_id"], 1);
    assert_eq!(data[0]["customer_id"], 42);
    assert_eq!(data[0]["status"], PENDING_STATUS);
    assert_eq!(data[1]["amount"], 150);
}

#[actix_web::test]
async fn fetch_orders_without_token_is_unauthorized() {
    let (status, body) = get_request("", "/orders?customer_id=42", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token provided.");
}

#[actix_web::test]
async fn fetch_orders_without_customer_id_is_a_bad_request() {
    let token = valid_token();
    let (status, _) = get_request(&token, "/orders", configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn store_failure_is_an_internal_error() {
    let token = valid_token();
    let (status, body) = get_request(&token, "/orders?customer_id=42", configure_failing_store).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap_or_default().contains("backend"));
}

fn valid_token() -> String {
    issue_token("customer-42", Utc::now() + Days::new(1))
}

fn configure(cfg: &mut ServiceConfig) {
    let mut store = MockOrderStore::new();
    store.expect_fetch_orders_for_customer().returning(|_| Ok(orders_response()));
    cfg.app_data(web::Data::new(store)).route("/orders", web::get().to(customer_orders::<MockOrderStore>));
}

fn configure_failing_store(cfg: &mut ServiceConfig) {
    let mut store = MockOrderStore::new();
    store
        .expect_fetch_orders_for_customer()
        .returning(|_| Err(OrderStoreError::DatabaseError("the database is on fire".to_string())));
    cfg.app_data(web::Data::new(store)).route("/orders", web::get().to(customer_orders::<MockOrderStore>));
}

// Mock response to `fetch_orders_for_customer` call
fn orders_response() -> Vec<CustomerOrderRecord> {
    vec![
        CustomerOrderRecord {
            order_id: 1,
            customer_id: 42,
            order_date: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
            order_items: r#"{"a":{"id":"a","quantity":2}}"#.to_string(),
            status: PENDING_STATUS.to_string(),
            amount: 100,
        },
        CustomerOrderRecord {
            order_id: 2,
            customer_id: 42,
            order_date: Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap(),
            order_items: r#"{"b":{"id":"b","quantity":1}}"#.to_string(),
            status: PENDING_STATUS.to_string(),
            amount: 150,
        },
    ]
}
