use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

use harborcrate::{AppState, app, config::Config, database, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    telemetry::init(&config.server.log_format)?;
    for warning in config.warnings() {
        tracing::warn!("{warning}");
    }

    info!(env = %config.server.app_env, "starting harborcrate");

    let db = database::connect(&config.database).await?;
    if config.database.auto_migrate {
        database::create_schema(&db).await?;
        info!("database schema ready");
    }

    let router = app(AppState::new(db), &config.cors.allowed_origins);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    info!("OpenAPI document at http://{addr}/api/openapi.json");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!("failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received terminate signal, shutting down"),
    }
}
