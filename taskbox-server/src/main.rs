use std::sync::Arc;

use tracing::info;

use taskbox_auth::{AuthorizationGate, KeyRing, TokenVerifier};
use taskbox_server::config::AppConfig;
use taskbox_server::routes::routes;
use taskbox_server::state::AppState;
use taskbox_store::{MemoryTable, TodoStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,taskbox_server=debug,taskbox_auth=debug,taskbox_store=debug"
                    .parse()
                    .unwrap()
            }),
        )
        .init();

    let config = AppConfig::from_env()?;
    let auth_config = config.auth_config();
    info!(issuer = %auth_config.issuer, table = %config.table_name, "Starting taskbox");

    let ring = Arc::new(KeyRing::new(auth_config.clone()));
    let verifier = TokenVerifier::new(ring, auth_config);
    let gate = AuthorizationGate::new(Arc::new(verifier));
    let todos = TodoStore::new(MemoryTable::new());

    let app = routes(AppState::new(gate, todos));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Taskbox listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Taskbox stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for Ctrl-C");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
