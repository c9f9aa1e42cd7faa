//! Wiring of the table gateway and object storage.
//!
//! Public routes use the project key. Admin routes act as the signed-in user
//! so the hosted backend's row-level policies apply to their writes.

use std::sync::Arc;

use domain::models::SiteSetting;
use domain::services::{AdminContext, Entity, GatewayError, ObjectStorage, TableGateway};
use persistence::{PgGateway, RestConfig, RestGateway, TableNames};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::config::{BackendKind, Config};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Gateway setup failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Gateways available to request handlers.
#[derive(Clone)]
pub struct Backend {
    gateway: Arc<dyn TableGateway>,
    storage: Arc<dyn ObjectStorage>,
    rest_tables: Option<RestGateway>,
    rest_storage: Option<RestGateway>,
    pool: Option<PgPool>,
}

impl Backend {
    /// Backend over arbitrary gateway implementations, without per-user scoping.
    pub fn new(gateway: Arc<dyn TableGateway>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            gateway,
            storage,
            rest_tables: None,
            rest_storage: None,
            pool: None,
        }
    }

    /// Hosted backend for both tables and files.
    pub fn rest(rest: RestGateway) -> Self {
        Self {
            gateway: Arc::new(rest.clone()),
            storage: Arc::new(rest.clone()),
            rest_tables: Some(rest.clone()),
            rest_storage: Some(rest),
            pool: None,
        }
    }

    /// Tables in a direct Postgres database, files in the hosted storage.
    pub fn postgres(gateway: PgGateway, storage: RestGateway) -> Self {
        let pool = gateway.pool().clone();
        Self {
            gateway: Arc::new(gateway),
            storage: Arc::new(storage.clone()),
            rest_tables: None,
            rest_storage: Some(storage),
            pool: Some(pool),
        }
    }

    /// Builds the backend selected by `config.backend.kind`.
    pub async fn connect(config: &Config) -> Result<Self, BackendError> {
        let rest = RestGateway::new(&RestConfig {
            url: config.backend.url.clone(),
            anon_key: config.backend.anon_key.clone(),
            table_suffix: config.backend.table_suffix.clone(),
            timeout_ms: config.backend.timeout_ms,
        })?;

        match config.backend.kind {
            BackendKind::Rest => {
                info!(url = %rest.base_url(), "Using hosted REST backend");
                Ok(Self::rest(rest))
            }
            BackendKind::Postgres => {
                let pool = persistence::db::create_pool(&(&config.database).into()).await?;
                if config.database.run_migrations {
                    info!("Running database migrations...");
                    persistence::db::run_migrations(&pool).await?;
                    info!("Migrations completed");
                }
                let tables = TableNames::new(config.backend.table_suffix.clone());
                Ok(Self::postgres(PgGateway::new(pool, tables), rest))
            }
        }
    }

    /// Gateway authorised with the project key.
    pub fn gateway(&self) -> Arc<dyn TableGateway> {
        self.gateway.clone()
    }

    /// Gateway acting as the signed-in admin.
    pub fn gateway_for(&self, admin: &AdminContext) -> Arc<dyn TableGateway> {
        match &self.rest_tables {
            Some(rest) => Arc::new(rest.with_access_token(admin.access_token())),
            None => self.gateway.clone(),
        }
    }

    /// File storage acting as the signed-in admin.
    pub fn storage_for(&self, admin: &AdminContext) -> Arc<dyn ObjectStorage> {
        match &self.rest_storage {
            Some(rest) => Arc::new(rest.with_access_token(admin.access_token())),
            None => self.storage.clone(),
        }
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Cheapest round trip that proves the content tables are reachable.
    pub async fn ping(&self) -> Result<(), GatewayError> {
        if let Some(pool) = &self.pool {
            return persistence::db::ping(pool)
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()));
        }
        self.gateway.count(SiteSetting::TABLE, &[]).await.map(|_| ())
    }
}
