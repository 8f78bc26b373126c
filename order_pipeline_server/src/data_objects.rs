use order_pipeline_engine::db_types::CustomerOrderRecord;
use serde::{Deserialize, Serialize};

/// The body of every plain acknowledgement or error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}

/// The body of a successful order listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub message: String,
    pub data: Vec<CustomerOrderRecord>,
}
