// Database repository management

mod sales_repository;

pub use sales_repository::SalesRepository;

use sea_orm::DatabaseConnection;

/// Container for all database repositories
pub struct Repositories {
    pub sales: SalesRepository,
}

impl Repositories {
    /// Creates a new repositories container with database connection
    pub fn new(conn: DatabaseConnection) -> Self {
        Repositories {
            sales: SalesRepository::new(conn),
        }
    }
}
