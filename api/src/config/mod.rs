// Configuration management from environment variables

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use thiserror::Error;

/// Error raised for unparseable configuration values; fatal at boot.
#[derive(Debug, Error)]
#[error("invalid value for {var}: {value}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Redis connection settings
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
}

impl RedisConfig {
    /// Returns the connection URL understood by the redis client
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/", self.host, self.port)
        } else {
            format!("redis://:{}@{}:{}/", self.password, self.host, self.port)
        }
    }
}

/// Caps enforced on reservations and purchases
#[derive(Debug, Clone, Copy)]
pub struct SaleLimits {
    /// Global live-reservation cap; also the finalization quota
    pub inventory_cap: u64,
    /// Live reservations allowed per user at once
    pub concurrent_cap: u64,
    /// Lifetime purchases allowed per user
    pub total_cap: u64,
}

/// Token-bucket settings for the request throttle
#[derive(Debug, Clone, Copy)]
pub struct ThrottleConfig {
    pub rate_per_sec: u64,
    pub burst: u64,
}

/// Configuration settings for the flash-sale API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Server configuration
    pub port: u16,

    // Database configuration
    pub database_url: String,

    // Redis configuration
    pub redis: RedisConfig,

    /// TTL applied to item locks, reservation records and set scores
    pub reservation_timeout: Duration,

    pub limits: SaleLimits,
    pub throttle: ThrottleConfig,
}

impl AppConfig {
    /// Creates configuration instance from environment variables with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let port = parse_env("PORT", 8080)?;

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            env_or("PG_USER", "postgres"),
            env_or("PG_PASSWORD", "postgres"),
            env_or("PG_HOST", "postgres"),
            env_or("PG_PORT", "5432"),
            env_or("PG_DB", "sales"),
        );

        let redis = RedisConfig {
            host: env_or("REDIS_HOST", "redis"),
            port: parse_env("REDIS_PORT", 6379)?,
            password: env_or("REDIS_PASSWORD", ""),
        };

        let reservation_timeout = Duration::from_secs(parse_env("RESERVATION_TIMEOUT", 600)?);

        let limits = SaleLimits {
            inventory_cap: parse_env("INVENTORY_CAP", 10_000)?,
            concurrent_cap: parse_env("CONCURRENT_CAP", 10)?,
            total_cap: parse_env("TOTAL_CAP", 10)?,
        };

        let throttle = ThrottleConfig {
            rate_per_sec: parse_env("THROTTLE_RATE", 2_000)?,
            burst: parse_env("THROTTLE_BURST", 5_000)?,
        };

        Ok(Self {
            port,
            database_url,
            redis,
            reservation_timeout,
            limits,
            throttle,
        })
    }

    /// Returns formatted server address string (host:port)
    pub fn server_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value.parse::<T>().map_err(|_| ConfigError { var, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redis_url_without_password() {
        let redis = RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            password: String::new(),
        };
        assert_eq!(redis.url(), "redis://localhost:6379/");
    }

    #[test]
    fn redis_url_with_password() {
        let redis = RedisConfig {
            host: "cache".to_string(),
            port: 6380,
            password: "secret".to_string(),
        };
        assert_eq!(redis.url(), "redis://:secret@cache:6380/");
    }

    #[test]
    fn parse_env_uses_default_when_unset() {
        assert_eq!(parse_env("FLASHSALE_TEST_UNSET_VAR", 42u64).unwrap(), 42);
    }

    #[test]
    fn parse_env_rejects_garbage() {
        env::set_var("FLASHSALE_TEST_GARBAGE_VAR", "not-a-number");
        let err = parse_env::<u64>("FLASHSALE_TEST_GARBAGE_VAR", 1).unwrap_err();
        assert_eq!(err.var, "FLASHSALE_TEST_GARBAGE_VAR");
        env::remove_var("FLASHSALE_TEST_GARBAGE_VAR");
    }

    #[test]
    fn parse_env_reads_value() {
        env::set_var("FLASHSALE_TEST_PORT_VAR", "9090");
        assert_eq!(parse_env("FLASHSALE_TEST_PORT_VAR", 8080u16).unwrap(), 9090);
        env::remove_var("FLASHSALE_TEST_PORT_VAR");
    }
}
