//! Wires the store, identity provider and service together and serves HTTP.

use std::sync::Arc;

use axum::{http::HeaderValue, Server};
use mockable::DefaultClock;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    auth::{create_identity_provider, AuthError},
    config::Config,
    db,
    repository::SqliteTodoRepository,
    route::create_router,
    service::TodoService,
    AppState,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database setup failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("identity provider setup failed: {0}")]
    Identity(#[from] AuthError),
    #[error("server error: {0}")]
    Server(String),
}

pub async fn run(config: Config) -> Result<(), StartupError> {
    let pool = db::connect(&config.database_url, config.database_max_connections).await?;
    info!("connection to the database is successful");

    let clock = Arc::new(DefaultClock);
    let identity = create_identity_provider(&config.auth, pool.clone(), clock.clone())?;
    let todos = TodoService::new(Arc::new(SqliteTodoRepository::new(pool)), clock);
    let app_state = Arc::new(AppState { todos, identity });

    let cors_origin = match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => Some(origin),
        Err(_) => {
            warn!(origin = %config.cors_origin, "ignoring unparsable CORS origin");
            None
        }
    };
    let app = create_router(app_state, cors_origin);

    info!(address = %config.bind_address, "server started");
    Server::bind(&config.bind_address)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| StartupError::Server(err.to_string()))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
