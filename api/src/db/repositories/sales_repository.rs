use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::db::error::DbError;
use crate::entity::prelude::{CheckoutAttempts, Sales};
use crate::entity::{checkout_attempts, sales};
use crate::services::window::SaleWindow;

/// Status of a sale awaiting the end-of-window commit decision
pub const SALE_STATUS_PENDING: &str = "pending";
/// Status of a sale confirmed by a finalization run
pub const SALE_STATUS_CONFIRMED: &str = "confirmed";

/// Repository for checkout attempts and sales
pub struct SalesRepository {
    conn: DatabaseConnection,
}

impl SalesRepository {
    /// Creates a new sales repository with the given database connection
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Records a checkout attempt. The `code` column is unique, so replaying
    /// the same code fails the insert.
    pub async fn save_checkout_attempt(
        &self,
        user_id: &str,
        item_id: &str,
        code: &str,
    ) -> Result<(), DbError> {
        let attempt = checkout_attempts::ActiveModel {
            user_id: Set(user_id.to_string()),
            item_id: Set(item_id.to_string()),
            code: Set(code.to_string()),
            used: Set(false),
            ..Default::default()
        };

        CheckoutAttempts::insert(attempt).exec(&self.conn).await?;
        Ok(())
    }

    /// Persists a purchase: inserts a pending sale and marks the matching
    /// checkout attempt as used. Both statements commit together or neither
    /// does. `purchased_at` is assigned by the database.
    pub async fn process_purchase(
        &self,
        user_id: &str,
        item_id: &str,
        code: &str,
    ) -> Result<(), DbError> {
        let txn = self.conn.begin().await?;

        let sale = sales::ActiveModel {
            user_id: Set(user_id.to_string()),
            item_id: Set(item_id.to_string()),
            status: Set(SALE_STATUS_PENDING.to_string()),
            ..Default::default()
        };
        Sales::insert(sale).exec(&txn).await?;

        CheckoutAttempts::update_many()
            .col_expr(checkout_attempts::Column::Used, Expr::value(true))
            .filter(checkout_attempts::Column::Code.eq(code))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    /// End-of-window commit decision. Counts pending sales inside `window`;
    /// confirms all of them when the count equals `quota`, deletes them
    /// otherwise. Returns the pre-transition count, so a rerun over an
    /// already-finalized window returns 0 and changes nothing.
    pub async fn finalize_sales(&self, window: SaleWindow, quota: u64) -> Result<u64, DbError> {
        let txn = self.conn.begin().await?;

        let pending = Sales::find()
            .filter(sales::Column::Status.eq(SALE_STATUS_PENDING))
            .filter(sales::Column::PurchasedAt.gte(window.start))
            .filter(sales::Column::PurchasedAt.lt(window.end))
            .count(&txn)
            .await?;

        if pending == quota {
            Sales::update_many()
                .col_expr(sales::Column::Status, Expr::value(SALE_STATUS_CONFIRMED))
                .col_expr(sales::Column::CommittedAt, Expr::value(chrono::Utc::now()))
                .filter(sales::Column::Status.eq(SALE_STATUS_PENDING))
                .filter(sales::Column::PurchasedAt.gte(window.start))
                .filter(sales::Column::PurchasedAt.lt(window.end))
                .exec(&txn)
                .await?;
        } else {
            Sales::delete_many()
                .filter(sales::Column::Status.eq(SALE_STATUS_PENDING))
                .filter(sales::Column::PurchasedAt.gte(window.start))
                .filter(sales::Column::PurchasedAt.lt(window.end))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(pending)
    }
}
