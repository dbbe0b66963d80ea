//! Prelude module for convenient imports

pub use super::checkout_attempts::Entity as CheckoutAttempts;
pub use super::sales::Entity as Sales;
