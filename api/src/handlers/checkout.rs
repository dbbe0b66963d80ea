// Handler for the checkout endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::{ApiError, ApiResult};
use crate::handlers::AppState;
use crate::models::{CheckoutParams, CheckoutResponse};

/// Handler for POST /checkout - Reserves an item for a user and returns the
/// reservation code to purchase with
pub async fn checkout(
    State(state): State<AppState>,
    Query(params): Query<CheckoutParams>,
) -> ApiResult<Json<CheckoutResponse>> {
    let (user_id, item_id) = match (params.user_id, params.id) {
        (Some(user_id), Some(item_id)) if !user_id.is_empty() && !item_id.is_empty() => {
            (user_id, item_id)
        }
        _ => {
            state.service.status().record_failed_checkout();
            return Err(ApiError::missing_param("Missing user_id or id parameters"));
        }
    };

    match state.service.create_reservation(&user_id, &item_id).await {
        Ok(code) => Ok(Json(CheckoutResponse {
            message: "success".to_string(),
            code,
        })),
        Err(err) => {
            tracing::warn!(user_id = %user_id, item_id = %item_id, error = %err, "checkout failed");
            state.service.status().record_failed_checkout();
            Err(err.into())
        }
    }
}
