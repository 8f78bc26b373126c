use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use order_pipeline_engine::{db_types::OrderValidationError, PipelineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Bad request: Invalid JSON in the payload.")]
    CouldNotDeserializePayload,
    #[error("{0}")]
    OrderValidation(#[from] OrderValidationError),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::OrderValidation(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken(_) => StatusCode::FORBIDDEN,
                AuthError::ExpiredToken => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "message": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No token provided.")]
    MissingToken,
    #[error("Forbidden: invalid or expired token.")]
    InvalidToken(String),
    #[error("Forbidden: invalid or expired token.")]
    ExpiredToken,
}

impl From<PipelineError> for ServerError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::ValidationError(v) => Self::OrderValidation(v),
            PipelineError::QueueError(e) => Self::BackendError(format!("Queue error: {e}")),
            PipelineError::OrderStoreError(e) => Self::BackendError(format!("Order store error: {e}")),
            PipelineError::InventoryError(e) => Self::BackendError(format!("Inventory error: {e}")),
        }
    }
}
