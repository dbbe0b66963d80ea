// API request/response models
use serde::{Deserialize, Serialize};

/// Query parameters for POST /checkout
#[derive(Debug, Deserialize)]
pub struct CheckoutParams {
    pub user_id: Option<String>,
    pub id: Option<String>,
}

/// Query parameters for POST /purchase
#[derive(Debug, Deserialize)]
pub struct PurchaseParams {
    pub code: Option<String>,
}

/// Response structure for a successful checkout
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub code: String,
}

/// Response structure for a successful purchase
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub message: String,
    pub user: String,
    pub item: String,
}

/// Response structure for GET /status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub seconds_remaining: i64,
    pub successful_checkouts: u64,
    pub failed_checkouts: u64,
    pub successful_purchases: u64,
    pub failed_purchases: u64,
    pub scheduled_goods: u64,
    pub purchased_goods: u64,
    pub sale_status: String,
}
