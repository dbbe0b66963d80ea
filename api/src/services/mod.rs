// Business logic service implementations

pub mod finalizer;
pub mod flash_sale;
pub mod status;
pub mod throttle;
pub mod window;
