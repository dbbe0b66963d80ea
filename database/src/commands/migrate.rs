use sea_orm::Database;
use std::error::Error;
use tracing::{error, info};

use flashsale_migration::{Migrator, MigratorTrait};

use crate::config::DatabaseConfig;

/// Execute the migrate command
pub async fn execute(steps: Option<u32>) -> Result<(), Box<dyn Error>> {
    let connection = connect().await?;

    match steps {
        Some(n) => {
            info!("Running {} migrations", n);
            if let Err(e) = Migrator::up(&connection, Some(n)).await {
                error!("Failed to run migrations: {}", e);
                return Err(Box::new(e));
            }
        }
        None => {
            info!("Running all pending migrations");
            if let Err(e) = Migrator::up(&connection, None).await {
                error!("Failed to run migrations: {}", e);
                return Err(Box::new(e));
            }
        }
    }

    info!("Migrations complete");
    Ok(())
}

/// Drop every table and re-run all migrations
pub async fn reset() -> Result<(), Box<dyn Error>> {
    let connection = connect().await?;

    info!("Dropping all tables and re-running migrations");
    Migrator::fresh(&connection).await?;
    info!("Database reset complete");
    Ok(())
}

/// Show applied and pending migrations
pub async fn status() -> Result<(), Box<dyn Error>> {
    let connection = connect().await?;

    let applied = Migrator::get_applied_migrations(&connection).await?;
    info!("Applied migrations: {}", applied.len());
    for migration in &applied {
        info!("  {}", migration.name());
    }

    let pending = Migrator::get_pending_migrations(&connection).await?;
    info!("Pending migrations: {}", pending.len());
    for migration in &pending {
        info!("  {}", migration.name());
    }

    Ok(())
}

async fn connect() -> Result<sea_orm::DatabaseConnection, Box<dyn Error>> {
    let config = DatabaseConfig::from_env();
    info!("Connecting to database: {}", config.url);
    Ok(Database::connect(&config.url).await?)
}
