// Error types for the Redis reservation store

use thiserror::Error;

/// Errors surfaced by reservation-store operations. The deny variants carry
/// the exact client-visible message.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("item has already been sold")]
    ItemAlreadySold,

    #[error("item already reserved")]
    ItemReserved,

    #[error("sale completed, items sold out")]
    SoldOut,

    #[error("purchase limit of {0} items exceeded for this user")]
    TotalLimitExceeded(u64),

    #[error("concurrent reservation limit exceeded for this user")]
    ConcurrentLimitExceeded,

    #[error("Reservation not found or expired")]
    NotFound,

    #[error("invalid reservation data format")]
    InvalidFormat,

    #[error("redis error: {0}")]
    Backend(#[from] redis::RedisError),
}

impl ReservationError {
    /// True for denials the client can act on; backend faults and corrupt
    /// records map to a generic internal error instead.
    pub fn is_domain(&self) -> bool {
        !matches!(
            self,
            ReservationError::Backend(_) | ReservationError::InvalidFormat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_messages_are_client_visible() {
        assert_eq!(
            ReservationError::ItemAlreadySold.to_string(),
            "item has already been sold"
        );
        assert_eq!(
            ReservationError::ItemReserved.to_string(),
            "item already reserved"
        );
        assert_eq!(
            ReservationError::SoldOut.to_string(),
            "sale completed, items sold out"
        );
        assert_eq!(
            ReservationError::TotalLimitExceeded(10).to_string(),
            "purchase limit of 10 items exceeded for this user"
        );
        assert_eq!(
            ReservationError::ConcurrentLimitExceeded.to_string(),
            "concurrent reservation limit exceeded for this user"
        );
        assert_eq!(
            ReservationError::NotFound.to_string(),
            "Reservation not found or expired"
        );
    }

    #[test]
    fn domain_classification() {
        assert!(ReservationError::ItemReserved.is_domain());
        assert!(ReservationError::NotFound.is_domain());
        assert!(ReservationError::TotalLimitExceeded(10).is_domain());
        assert!(!ReservationError::InvalidFormat.is_domain());
    }
}
