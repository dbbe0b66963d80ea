// Flash-sale coordinator: mediates the two-store reservation protocol

use std::time::Duration;

use rand::RngCore;
use thiserror::Error;

use crate::config::SaleLimits;
use crate::db::repositories::SalesRepository;
use crate::db::DbError;
use crate::kv::{ReservationError, ReservationStore};
use crate::services::status::SaleStatus;
use crate::services::window::SaleWindow;

/// Deadline for the compensating Redis delete after a failed DB write.
const COMPENSATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseResult {
    pub user_id: String,
    pub item_id: String,
}

/// Errors from the checkout, purchase and finalization protocols.
#[derive(Debug, Error)]
pub enum SaleError {
    #[error("sale completed, items sold out")]
    SaleCompleted,

    #[error(transparent)]
    Reservation(#[from] ReservationError),

    #[error("failed to save checkout attempt: {0}")]
    CheckoutPersist(DbError),

    #[error("failed to delete reservation: {0}")]
    PurchaseAborted(ReservationError),

    #[error("failed to process purchase in db: {0}")]
    PurchasePersist(DbError),

    #[error("db finalization failed: {0}")]
    Finalize(DbError),
}

impl SaleError {
    /// Domain denials carry their message to the client; everything else is
    /// reported as a generic internal error.
    pub fn is_domain(&self) -> bool {
        match self {
            SaleError::SaleCompleted => true,
            SaleError::Reservation(err) => err.is_domain(),
            _ => false,
        }
    }
}

/// Service layer owning every transition over the Redis and PostgreSQL
/// stores. Handlers and the finalizer never touch the adapters directly.
pub struct FlashSaleService {
    db: SalesRepository,
    kv: ReservationStore,
    status: SaleStatus,
    limits: SaleLimits,
}

impl FlashSaleService {
    pub fn new(db: SalesRepository, kv: ReservationStore, limits: SaleLimits) -> Self {
        Self {
            db,
            kv,
            status: SaleStatus::new(),
            limits,
        }
    }

    pub fn status(&self) -> &SaleStatus {
        &self.status
    }

    /// Checkout protocol: reserve in Redis first, then persist the checkout
    /// attempt. A failed DB write rolls the reservation back so the item does
    /// not stay locked for the full TTL.
    pub async fn create_reservation(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<String, SaleError> {
        if self.status.is_sale_completed() {
            return Err(SaleError::SaleCompleted);
        }

        let code = generate_code();

        self.kv.create_reservation(user_id, item_id, &code).await?;

        if let Err(err) = self.db.save_checkout_attempt(user_id, item_id, &code).await {
            self.compensate_reservation(user_id, item_id, &code).await;
            return Err(SaleError::CheckoutPersist(err));
        }

        self.status.record_successful_checkout();
        self.status.record_scheduled_good();
        Ok(code)
    }

    /// Rolls the Redis reservation back after a failed DB write. The delete
    /// runs on a detached task under its own deadline, so a disconnected
    /// client cannot cancel it mid-flight; a failed rollback leaves the item
    /// locked until the TTL and is logged as divergence.
    async fn compensate_reservation(&self, user_id: &str, item_id: &str, code: &str) {
        let kv = self.kv.clone();
        let user_id = user_id.to_string();
        let item_id = item_id.to_string();
        let code = code.to_string();

        let rollback = tokio::spawn(async move {
            let delete = kv.delete_reservation(&user_id, &item_id, &code);
            match tokio::time::timeout(COMPENSATION_TIMEOUT, delete).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::error!(
                    user_id = %user_id,
                    item_id = %item_id,
                    code = %code,
                    error = %err,
                    "reservation rollback failed, stores may have diverged"
                ),
                Err(_) => tracing::error!(
                    user_id = %user_id,
                    item_id = %item_id,
                    code = %code,
                    "reservation rollback timed out, stores may have diverged"
                ),
            }
        });

        let _ = rollback.await;
    }

    /// Purchase protocol. The reservation is deleted from Redis *before* the
    /// DB write so a replayed code cannot double-book; the sold marker is
    /// written *after* the DB commit so it only ever covers persisted sales.
    pub async fn process_purchase(&self, code: &str) -> Result<PurchaseResult, SaleError> {
        let (user_id, item_id) = self.kv.get_reservation(code).await?;

        self.kv
            .delete_reservation(&user_id, &item_id, code)
            .await
            .map_err(SaleError::PurchaseAborted)?;

        if let Err(err) = self.db.process_purchase(&user_id, &item_id, code).await {
            // The reservation is gone from Redis but no sale was persisted.
            // Recreating it could breach the per-user caps, so the divergence
            // is only logged.
            tracing::error!(
                user_id = %user_id,
                item_id = %item_id,
                code = %code,
                error = %err,
                "purchase not persisted after reservation delete, stores have diverged"
            );
            return Err(SaleError::PurchasePersist(err));
        }

        if let Err(err) = self.kv.mark_item_sold(&item_id).await {
            tracing::error!(
                user_id = %user_id,
                item_id = %item_id,
                code = %code,
                error = %err,
                "sale persisted but sold marker update failed"
            );
        }

        if let Err(err) = self.kv.increment_user_purchases(&user_id).await {
            tracing::error!(
                user_id = %user_id,
                item_id = %item_id,
                code = %code,
                error = %err,
                "sale persisted but purchase counter update failed"
            );
        }

        self.status.record_successful_purchase();
        self.status.record_purchased_good();
        Ok(PurchaseResult { user_id, item_id })
    }

    /// End-of-window commit: confirm the previous hour's pending sales iff
    /// their count equals the inventory cap, then reset counters and the
    /// transient Redis state for the new window.
    pub async fn finalize(&self) -> Result<(), SaleError> {
        let window = SaleWindow::previous_hour(chrono::Utc::now());
        let pending = self
            .db
            .finalize_sales(window, self.limits.inventory_cap)
            .await
            .map_err(SaleError::Finalize)?;

        if pending == self.limits.inventory_cap {
            tracing::info!(pending, "sales confirmed, exact quota reached");
            self.status.set_sale_completed(true);
        } else {
            tracing::info!(
                pending,
                quota = self.limits.inventory_cap,
                "quota not met, pending sales canceled"
            );
            self.status.set_sale_completed(false);
        }

        self.status.reset();

        if let Err(err) = self.kv.reset_transient().await {
            tracing::error!(error = %err, "transient reservation reset failed");
        }

        Ok(())
    }
}

/// 128-bit random reservation code, hex encoded.
fn generate_code() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_32_hex_chars() {
        let code = generate_code();
        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(code, code.to_lowercase());
    }

    #[test]
    fn codes_do_not_repeat() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_code()));
        }
    }

    #[test]
    fn domain_errors_keep_their_message() {
        let err = SaleError::Reservation(ReservationError::ItemReserved);
        assert!(err.is_domain());
        assert_eq!(err.to_string(), "item already reserved");

        assert!(SaleError::SaleCompleted.is_domain());
        assert_eq!(
            SaleError::SaleCompleted.to_string(),
            "sale completed, items sold out"
        );
    }

    #[test]
    fn backend_errors_are_internal() {
        let err = SaleError::CheckoutPersist(DbError::Statement("boom".to_string()));
        assert!(!err.is_domain());

        let err = SaleError::Finalize(DbError::Unreachable("down".to_string()));
        assert!(!err.is_domain());
    }
}
