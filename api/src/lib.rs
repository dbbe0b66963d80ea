//! Flash-sale coordination service.
//!
//! A fixed inventory of items is offered within each hour window. Concurrent
//! clients race to reserve (`POST /checkout`) and then purchase
//! (`POST /purchase`) items. Reservations and per-user limits live in Redis;
//! checkout attempts and sales are persisted in PostgreSQL, where an hourly
//! all-or-nothing commit confirms the window only when the exact sales quota
//! was reached.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod kv;
pub mod models;
pub mod services;
