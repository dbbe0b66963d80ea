// Redis-backed reservation state for the hot sale path

mod error;
mod reservation_store;

pub use error::ReservationError;
pub use reservation_store::ReservationStore;
