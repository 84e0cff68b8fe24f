use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_secretsmanager::Client as SecretsClient;
use lambda_runtime::tracing;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::secrets::fetch_db_secret;
use crate::Error;

pub mod diagnostics;
pub mod migrator;
pub mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use session::{with_connection, with_session};

/// Source of database connections for a single unit of work.
///
/// Handlers receive a factory instead of reaching for a global engine, so
/// tests can swap in an in-memory database.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(&self) -> Result<DatabaseConnection, Error>;

    /// Gives the connection back once the unit of work is over. Called
    /// exactly once for every successful [`ConnectionFactory::connect`].
    async fn release(&self, conn: DatabaseConnection) -> Result<(), Error> {
        conn.close().await.map_err(Error::from)
    }
}

/// Opens a fresh connection per unit of work using credentials resolved
/// from Secrets Manager.
pub struct SecretsManagerConnector {
    client: SecretsClient,
    secret_arn: Option<String>,
    connect_timeout: Duration,
}

impl SecretsManagerConnector {
    pub fn new(client: SecretsClient, secret_arn: Option<String>) -> Self {
        Self {
            client,
            secret_arn,
            connect_timeout: Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl ConnectionFactory for SecretsManagerConnector {
    async fn connect(&self) -> Result<DatabaseConnection, Error> {
        let secret_arn = self
            .secret_arn
            .as_deref()
            .filter(|arn| !arn.is_empty())
            .ok_or(Error::MissingSecretArn)?;

        let secret = fetch_db_secret(&self.client, secret_arn).await?;

        let mut opt = ConnectOptions::new(secret.connection_url());
        opt.max_connections(1)
            .min_connections(1)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.connect_timeout)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await.inspect_err(|e| {
            tracing::error!("Database connection error: {}", e);
        })?;
        tracing::debug!(host = %secret.host, dbname = %secret.dbname, "Opened database connection");
        Ok(conn)
    }
}

/// Applies pending migrations on the first connection handed out by the
/// wrapped factory. A warm container skips the check afterwards.
pub struct Migrated<F> {
    inner: F,
    applied: AtomicBool,
}

impl<F> Migrated<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            applied: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl<F: ConnectionFactory> ConnectionFactory for Migrated<F> {
    async fn connect(&self) -> Result<DatabaseConnection, Error> {
        let conn = self.inner.connect().await?;
        if self.applied.load(Ordering::Acquire) {
            return Ok(conn);
        }

        if let Err(e) = migrator::Migrator::up(&conn, None).await {
            tracing::error!("Failed to apply migrations: {}", e);
            if let Err(release_err) = self.inner.release(conn).await {
                tracing::warn!("Failed to release connection: {}", release_err);
            }
            return Err(e.into());
        }

        self.applied.store(true, Ordering::Release);
        tracing::info!("Database migrations applied");
        Ok(conn)
    }

    async fn release(&self, conn: DatabaseConnection) -> Result<(), Error> {
        self.inner.release(conn).await
    }
}
