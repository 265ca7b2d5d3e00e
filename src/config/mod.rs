use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;
use std::time::Duration;

use crate::database::executor::RetryPolicy;

// Top-level configuration, a container for every group of settings
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub retry: RetryConfig,
}

// HTTP server and process settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

// MySQL connection and pool settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub pool_size: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub keepalive_secs: u64,
}

// Retry budget for transient connection failures
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub attempts: u32,
    pub backoff_ms: u64,
}

/// Flat view of the process environment. `config::Environment` lowercases
/// variable names, so `DB_HOST` lands in `db_host`.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    host: String,
    port: u16,
    rust_log: String,
    log_format: LogFormat,
    shutdown_timeout_secs: u64,
    db_host: String,
    db_port: u16,
    db_user: String,
    db_password: String,
    db_name: String,
    db_pool_size: u32,
    db_connect_timeout_secs: u64,
    db_idle_timeout_secs: u64,
    db_keepalive_secs: u64,
    db_retry_attempts: u32,
    db_retry_backoff_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let settings: EnvSettings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("rust_log", "celebration_house=debug,tower_http=debug")?
            .set_default("log_format", "pretty")?
            .set_default("shutdown_timeout_secs", 10)?
            .set_default("db_host", "localhost")?
            .set_default("db_port", 3306)?
            .set_default("db_user", "root")?
            .set_default("db_password", "")?
            .set_default("db_name", "celebration_house")?
            .set_default("db_pool_size", 10)?
            .set_default("db_connect_timeout_secs", 20)?
            .set_default("db_idle_timeout_secs", 60)?
            .set_default("db_keepalive_secs", 300)?
            .set_default("db_retry_attempts", 3)?
            .set_default("db_retry_backoff_ms", 1000)?
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;

        Ok(settings.into())
    }
}

impl From<EnvSettings> for Config {
    fn from(env: EnvSettings) -> Self {
        Config {
            app: AppConfig {
                host: env.host,
                port: env.port,
                rust_log: env.rust_log,
                log_format: env.log_format,
                shutdown_timeout_secs: env.shutdown_timeout_secs,
            },
            database: DatabaseConfig {
                host: env.db_host,
                port: env.db_port,
                user: env.db_user,
                password: env.db_password,
                name: env.db_name,
                pool_size: env.db_pool_size,
                connect_timeout_secs: env.db_connect_timeout_secs,
                idle_timeout_secs: env.db_idle_timeout_secs,
                keepalive_secs: env.db_keepalive_secs,
            },
            retry: RetryConfig {
                attempts: env.db_retry_attempts,
                backoff_ms: env.db_retry_backoff_ms,
            },
        }
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);

        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(retry: &RetryConfig) -> Self {
        RetryPolicy {
            retries: retry.attempts,
            backoff: Duration::from_millis(retry.backoff_ms),
        }
    }
}
