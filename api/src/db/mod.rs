// Database Module
// This module handles database operations for the flash-sale API

mod error;
mod pool;
pub mod repositories;

pub use error::DbError;
pub use pool::DbPool;
pub use repositories::Repositories;
