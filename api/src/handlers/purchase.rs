// Handler for the purchase endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::{ApiError, ApiResult};
use crate::handlers::AppState;
use crate::models::{PurchaseParams, PurchaseResponse};

/// Handler for POST /purchase - Converts a reservation code into a pending sale
pub async fn purchase(
    State(state): State<AppState>,
    Query(params): Query<PurchaseParams>,
) -> ApiResult<Json<PurchaseResponse>> {
    let code = match params.code {
        Some(code) if !code.is_empty() => code,
        _ => {
            state.service.status().record_failed_purchase();
            return Err(ApiError::missing_param("Missing code parameter"));
        }
    };

    match state.service.process_purchase(&code).await {
        Ok(result) => Ok(Json(PurchaseResponse {
            message: "success".to_string(),
            user: result.user_id,
            item: result.item_id,
        })),
        Err(err) => {
            tracing::warn!(code = %code, error = %err, "purchase failed");
            state.service.status().record_failed_purchase();
            Err(err.into())
        }
    }
}
