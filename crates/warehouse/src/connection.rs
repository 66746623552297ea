//! Connection handling for the warehouse cluster.

use std::time::Duration;

use playdwh_core::ClusterConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::debug;

use crate::error::{WarehouseError, WarehouseResult};
use crate::session::WarehouseSession;

/// Connection tuning knobs for the warehouse client.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Timeout applied when establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Client owning the warehouse connection.
///
/// Every statement of a run goes through one [`WarehouseSession`] on one
/// connection, so the pool is capped at a single connection.
#[derive(Debug, Clone)]
pub struct WarehouseClient {
    pool: PgPool,
}

impl WarehouseClient {
    /// Connects to the cluster using default options.
    pub async fn connect(cluster: &ClusterConfig) -> WarehouseResult<Self> {
        Self::with_options(cluster, ConnectOptions::default()).await
    }

    /// Connects to the cluster using the provided tuning options.
    pub async fn with_options(
        cluster: &ClusterConfig,
        options: ConnectOptions,
    ) -> WarehouseResult<Self> {
        let pool = pool_options(options)
            .connect_with(pg_connect_options(cluster))
            .await
            .map_err(WarehouseError::Connect)?;
        debug!(
            host = %cluster.host,
            port = cluster.port,
            database = %cluster.database,
            "connected to warehouse"
        );
        Ok(Self { pool })
    }

    /// Connects to a DSN directly. Used by integration tests and ad-hoc
    /// tooling that already has a connection string.
    pub async fn connect_dsn(dsn: &str) -> WarehouseResult<Self> {
        let pool = pool_options(ConnectOptions::default())
            .connect(dsn)
            .await
            .map_err(WarehouseError::Connect)?;
        Ok(Self { pool })
    }

    /// Opens the session statements run on.
    pub async fn session(&self) -> WarehouseResult<WarehouseSession> {
        let conn = self.pool.acquire().await.map_err(WarehouseError::Connect)?;
        Ok(WarehouseSession::new(conn))
    }

    /// Closes the underlying connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn pool_options(options: ConnectOptions) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(options.connect_timeout)
}

fn pg_connect_options(cluster: &ClusterConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&cluster.host)
        .port(cluster.port)
        .database(&cluster.database)
        .username(&cluster.user)
        .password(&cluster.password)
}
