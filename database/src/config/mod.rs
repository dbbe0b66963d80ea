use std::env;

/// Database connection configuration for the management CLI
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
}

impl DatabaseConfig {
    /// Loads the connection URL from DATABASE_URL, falling back to the PG_*
    /// variables the service itself is configured with
    pub fn from_env() -> Self {
        if let Ok(url) = env::var("DATABASE_URL") {
            return Self { url };
        }

        let url = format!(
            "postgres://{}:{}@{}:{}/{}",
            env::var("PG_USER").unwrap_or_else(|_| "postgres".to_string()),
            env::var("PG_PASSWORD").unwrap_or_else(|_| "postgres".to_string()),
            env::var("PG_HOST").unwrap_or_else(|_| "postgres".to_string()),
            env::var("PG_PORT").unwrap_or_else(|_| "5432".to_string()),
            env::var("PG_DB").unwrap_or_else(|_| "sales".to_string()),
        );

        Self { url }
    }
}
