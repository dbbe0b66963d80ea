// Process-local sale metrics

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Lock-free counters updated from request handlers and read by the status
/// endpoint. All access goes through atomics; no lock is ever taken.
#[derive(Debug, Default)]
pub struct SaleStatus {
    successful_checkouts: AtomicU64,
    failed_checkouts: AtomicU64,
    successful_purchases: AtomicU64,
    failed_purchases: AtomicU64,
    scheduled_goods: AtomicU64,
    purchased_goods: AtomicU64,
    sale_completed: AtomicBool,
}

/// Point-in-time copy of the counters for the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub successful_checkouts: u64,
    pub failed_checkouts: u64,
    pub successful_purchases: u64,
    pub failed_purchases: u64,
    pub scheduled_goods: u64,
    pub purchased_goods: u64,
    pub sale_completed: bool,
}

impl SaleStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_successful_checkout(&self) {
        self.successful_checkouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_checkout(&self) {
        self.failed_checkouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_successful_purchase(&self) {
        self.successful_purchases.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_purchase(&self) {
        self.failed_purchases.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scheduled_good(&self) {
        self.scheduled_goods.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_purchased_good(&self) {
        self.purchased_goods.fetch_add(1, Ordering::Relaxed);
    }

    pub fn is_sale_completed(&self) -> bool {
        self.sale_completed.load(Ordering::Relaxed)
    }

    pub fn set_sale_completed(&self, completed: bool) {
        self.sale_completed.store(completed, Ordering::Relaxed);
    }

    /// Zeroes every counter and clears the completed flag. Readers may
    /// observe a mix of old and new values while the stores run.
    pub fn reset(&self) {
        self.successful_checkouts.store(0, Ordering::Relaxed);
        self.failed_checkouts.store(0, Ordering::Relaxed);
        self.successful_purchases.store(0, Ordering::Relaxed);
        self.failed_purchases.store(0, Ordering::Relaxed);
        self.scheduled_goods.store(0, Ordering::Relaxed);
        self.purchased_goods.store(0, Ordering::Relaxed);
        self.sale_completed.store(false, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            successful_checkouts: self.successful_checkouts.load(Ordering::Relaxed),
            failed_checkouts: self.failed_checkouts.load(Ordering::Relaxed),
            successful_purchases: self.successful_purchases.load(Ordering::Relaxed),
            failed_purchases: self.failed_purchases.load(Ordering::Relaxed),
            scheduled_goods: self.scheduled_goods.load(Ordering::Relaxed),
            purchased_goods: self.purchased_goods.load(Ordering::Relaxed),
            sale_completed: self.sale_completed.load(Ordering::Relaxed),
        }
    }
}
