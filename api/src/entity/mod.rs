//! Entity module for database models

pub mod checkout_attempts;
pub mod prelude;
pub mod sales;
