// API endpoint handlers implementation

mod checkout;
mod health;
mod purchase;
mod status;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::services::flash_sale::FlashSaleService;
use crate::services::throttle::TokenBucket;

// Handler function re-exports
pub use checkout::checkout;
pub use health::health_check;
pub use purchase::purchase;
pub use status::status;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FlashSaleService>,
    pub throttle: Arc<TokenBucket>,
}

/// Token-bucket admission control applied ahead of every route. Rejected
/// requests never reach the coordinator.
pub async fn throttle_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.throttle.try_acquire().await {
        next.run(request).await
    } else {
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too many requests" })),
        )
            .into_response()
    }
}
