//! Public library interface for the habit calendar server
//!
//! This module exports the server, the storage backends, the service
//! operations and the optimistic client so they can be embedded or tested.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

pub mod client;
pub mod config;
pub mod domain;
pub mod http;
pub mod service;
pub mod storage;

// Re-export public modules and types
pub use client::{ClientError, ClientSyncController, HabitApi, HttpApi, ServiceApi};
pub use config::{AppConfig, Args};
pub use domain::*;
pub use service::{HabitService, ServiceError};
pub use storage::{FileStore, HabitStore, SqliteStore, StorageError};

/// Errors that can occur while starting or running the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Habit calendar server: both stores behind the HTTP surface
pub struct HabitCalendarServer {
    service: Arc<HabitService>,
}

impl HabitCalendarServer {
    /// Open both stores described by `config`
    ///
    /// The SQLite schema is created or migrated; the habit document is
    /// created lazily on first write.
    pub fn new(config: &AppConfig) -> Result<Self, ServerError> {
        tracing::info!(
            "Initializing habit calendar with database {} and document {}",
            config.database.display(),
            config.document.display()
        );

        let relational = SqliteStore::open(&config.database)?;
        let file = FileStore::new(config.document.clone(), config.zone);

        Ok(Self::from_service(HabitService::new(file, relational, config.zone)))
    }

    pub fn from_service(service: HabitService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Shared handle to the service layer (useful for testing)
    pub fn service(&self) -> Arc<HabitService> {
        Arc::clone(&self.service)
    }

    pub fn router(&self) -> axum::Router {
        http::router(http::AppState::new(self.service()))
    }

    /// Serve on `listener` until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!("listening on http://{addr}");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    /// Bind `config.listen` and serve until Ctrl-C
    pub async fn run(self, config: &AppConfig) -> Result<(), ServerError> {
        let listener = TcpListener::bind(config.listen).await?;
        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        // Without a signal handler, run until the process is killed
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
