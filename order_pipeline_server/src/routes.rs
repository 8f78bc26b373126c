//! Request handlers for the order endpoints.
//!
//! `submit_order` and `customer_orders` are generic over the queue and storage traits so that the endpoint tests can
//! run them against in-process fakes; `create_server_instance` pins them to the concrete types.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use order_pipeline_engine::{db_types::NewOrder, queue::WorkQueue, traits::OrderManagement, IntakeApi};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    auth::JwtClaims,
    data_objects::{JsonResponse, OrderListResponse},
    errors::ServerError,
};

/// Route handler for the health check endpoint
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Route handler for `POST /orders`.
///
/// The raw body is parsed and validated before anything is enqueued, so a rejected submission leaves no trace in the
/// system. A 200 means the order is on the intake queue, not that stock exists for it.
pub async fn submit_order<Q>(
    claims: JwtClaims,
    body: web::Bytes,
    api: web::Data<IntakeApi<Q>>,
) -> Result<HttpResponse, ServerError>
where
    Q: WorkQueue<NewOrder> + 'static,
{
    trace!("💻️ Order submission from {}", claims.sub);
    let payload = serde_json::from_slice::<Value>(&body).map_err(|e| {
        debug!("💻️ Could not parse order payload. {e}");
        ServerError::CouldNotDeserializePayload
    })?;
    let order = api.submit_order(&payload).await?;
    debug!("💻️ Order {} for customer {} accepted from {}", order.order_id, order.customer_id, claims.sub);
    Ok(HttpResponse::Ok().json(JsonResponse::success("Order received successfully.")))
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerOrdersQuery {
    pub customer_id: i64,
}

/// Route handler for `GET /orders?customer_id=`.
pub async fn customer_orders<B>(
    claims: JwtClaims,
    query: web::Query<CustomerOrdersQuery>,
    db: web::Data<B>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + 'static,
{
    let customer_id = query.customer_id;
    trace!("💻️ Order listing for customer {customer_id} requested by {}", claims.sub);
    let orders = db.fetch_orders_for_customer(customer_id).await.map_err(|e| {
        debug!("💻️ Could not fetch orders for customer {customer_id}. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    debug!("💻️ Returning {} order(s) for customer {customer_id}", orders.len());
    Ok(HttpResponse::Ok().json(OrderListResponse { message: "Success.".to_string(), data: orders }))
}
