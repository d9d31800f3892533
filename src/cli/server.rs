use anyhow::Result;
use imbds_shared::user::Role;

use crate::config::{Config, RootConfig};
use crate::routes::AppState;

pub async fn serve(
    config: Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting imbds server...");

    // Use CLI overrides if provided, otherwise use config
    let host = host_override.unwrap_or(config.server.host.to_owned());
    let port = port_override.unwrap_or(config.server.port);

    let pool = imbds_db::create_pool(&config.database.url, config.database.max_connections).await?;
    imbds_db::migrate(&pool).await?;

    let state = AppState::new(config, pool.clone());

    if let Some(root) = &state.config.root {
        bootstrap_root(&state.user_command, root).await?;
    }

    let app = crate::routes::router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Closing database pool...");
    pool.close().await;
    tracing::info!("Graceful shutdown complete");

    Ok(())
}

/// Create the configured root Admin unless a principal with that username exists.
pub async fn bootstrap_root(command: &imbds_user::Command, root: &RootConfig) -> Result<()> {
    if command.find_by_username(&root.username).await?.is_some() {
        tracing::debug!(username = %root.username, "root principal already present");
        return Ok(());
    }

    let id = command
        .register(imbds_user::RegisterInput {
            username: root.username.to_owned(),
            email: root.email.to_owned(),
            password: root.password.to_owned(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Admin,
        })
        .await?;

    tracing::info!(principal_id = id, "root principal created");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
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
