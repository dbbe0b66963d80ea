// Handler for the sale status endpoint

use axum::{extract::State, Json};

use crate::handlers::AppState;
use crate::models::StatusResponse;
use crate::services::window;

/// Handler for GET /status - Returns the sale counters and the seconds left
/// in the current hour window
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.service.status().snapshot();

    Json(StatusResponse {
        seconds_remaining: window::seconds_until_next_hour(chrono::Utc::now()),
        successful_checkouts: snapshot.successful_checkouts,
        failed_checkouts: snapshot.failed_checkouts,
        successful_purchases: snapshot.successful_purchases,
        failed_purchases: snapshot.failed_purchases,
        scheduled_goods: snapshot.scheduled_goods,
        purchased_goods: snapshot.purchased_goods,
        sale_status: if snapshot.sale_completed {
            "completed"
        } else {
            "active"
        }
        .to_string(),
    })
}
