pub mod executor;
pub mod keepalive;

use sqlx::{mysql::MySqlPoolOptions, MySql, Pool};
use tracing::{debug, info};

use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<MySql>,
}

impl Database {
    /// Builds the pool without opening a connection. Connections are
    /// established on first use, so an unreachable server at boot leaves the
    /// process running in degraded mode instead of aborting it.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .test_before_acquire(true)
            .after_connect(|_conn, _meta| {
                Box::pin(async move {
                    debug!("Opened new MySQL connection");
                    Ok(())
                })
            })
            .connect_lazy_with(config.connect_options());

        info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            pool_size = config.pool_size,
            "Database pool configured"
        );

        Database { pool }
    }

    /// Drains the pool. Checked-out connections are closed as they are returned.
    pub async fn close(&self) {
        info!("Closing database pool...");
        self.pool.close().await;
        info!("Database pool closed");
    }
}
