use anyhow::Result;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::routes::AppState;

/// Router with the full middleware stack.
pub fn app(state: AppState) -> axum::Router {
    crate::routes::router(state)
        .layer(axum::middleware::from_fn(
            crate::middleware::cache_control_middleware,
        ))
        .layer(axum::middleware::map_response(
            crate::middleware::minify_html_middleware,
        ))
        .layer(CompressionLayer::new().br(true).gzip(true))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(
    config: crate::Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting mealdays server...");

    let host = host_override.unwrap_or(config.server.host.to_owned());
    let port = port_override.unwrap_or(config.server.port);

    let write_pool = crate::db::create_write_pool(&config.database.url).await?;
    super::run_migrations(&write_pool).await?;

    let read_pool =
        crate::db::create_read_pool(&config.database.url, config.database.max_connections)
            .await?;

    let shared = mealdays_shared::State {
        read_db: read_pool.clone(),
        write_db: write_pool.clone(),
    };

    let state = AppState {
        config,
        command: mealdays_mealday::Command(shared.clone()),
        query: mealdays_mealday::Query(shared),
        pool: read_pool.clone(),
    };

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Closing database pools...");
    read_pool.close().await;
    write_pool.close().await;

    tracing::info!("Graceful shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Starting graceful shutdown...");
}
