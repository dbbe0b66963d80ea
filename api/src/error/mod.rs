use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::flash_sale::SaleError;

/// The only message internal failures ever leak to a client.
pub const INTERNAL_ERROR_MSG: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Domain(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn missing_param(message: &str) -> Self {
        ApiError::Validation(message.to_string())
    }
}

// SaleError to ApiError conversion implementation
impl From<SaleError> for ApiError {
    fn from(err: SaleError) -> Self {
        if err.is_domain() {
            ApiError::Domain(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, err_msg) = match self {
            ApiError::Validation(msg) | ApiError::Domain(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                // The wrapped detail stays in the logs, never in the response
                tracing::error!("request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MSG.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": err_msg
        }));

        (status, body).into_response()
    }
}
