use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::executor::QueryExecutor;

/// Pings the database on a fixed interval so idle pooled connections are not
/// dropped by the server or a proxy in between. Failures are only logged.
pub fn spawn(executor: QueryExecutor, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match executor.ping().await {
                Ok(()) => debug!("Keep-alive ping succeeded"),
                Err(e) => warn!(error = %e, "Keep-alive ping failed"),
            }
        }
    })
}
