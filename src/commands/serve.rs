//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{AccountRepository, AccountStore, Database, InMemoryAccountStore};
use crate::services::Registrar;

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Flags win over the environment
    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    let app_state = if args.ephemeral {
        tracing::warn!("Using in-memory account store, accounts are lost on exit");
        let accounts: Arc<dyn AccountRepository> = Arc::new(InMemoryAccountStore::new());
        let service = Registrar::from_config(accounts, &config)?;
        AppState::without_database(Arc::new(service))
    } else {
        let db = Arc::new(Database::connect(&config).await?);
        let accounts: Arc<dyn AccountRepository> = Arc::new(
            AccountStore::new(db.get_connection())
                .with_statement_timeout(config.repository_timeout()),
        );
        let service = Registrar::from_config(accounts, &config)?;
        AppState::new(Arc::new(service), db)
    };

    tracing::debug!(policy = ?config.policy, "Credential policy loaded");

    let app = create_router(app_state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
