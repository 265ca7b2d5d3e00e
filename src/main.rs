use std::net::SocketAddr;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use celebration_house::{
    app,
    config::{Config, LogFormat},
    database::keepalive,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log));
    match config.app.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    info!("Starting Celebration House booking API");

    let state = AppState::new(config.clone());

    // An unreachable database is not fatal: requests fail until it comes back
    match state.executor.ping().await {
        Ok(()) => info!("Database connected"),
        Err(e) => error!(error = %e, "Database unreachable at startup, running in degraded mode"),
    }

    // --- Start background tasks ---

    let keepalive_task = keepalive::spawn(
        state.executor.clone(),
        config.database.keepalive_interval(),
    );

    // --- Start the web server ---

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let shutdown_timeout = Duration::from_secs(config.app.shutdown_timeout_secs);
    axum::serve(listener, app(state.clone()))
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("HTTP server stopped");
    keepalive_task.abort();
    state.db.close().await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and arms a watchdog that kills the process
/// if the graceful shutdown has not finished within `timeout`.
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");

    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        warn!("Graceful shutdown timed out after {:?}, forcing exit", timeout);
        std::process::exit(1);
    });
}
