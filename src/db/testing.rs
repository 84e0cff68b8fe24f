use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use super::migrator::Migrator;
use super::ConnectionFactory;
use crate::Error;

/// Hands out clones of a single in-memory SQLite connection and counts how
/// often it is acquired and given back.
pub(crate) struct MemoryDatabase {
    conn: DatabaseConnection,
    connects: AtomicUsize,
    releases: AtomicUsize,
}

impl MemoryDatabase {
    pub(crate) async fn new() -> Self {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        // Every pooled connection would get its own empty database.
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let conn = Database::connect(opt).await.unwrap();
        Self {
            conn,
            connects: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
        }
    }

    pub(crate) async fn migrated() -> Self {
        let db = Self::new().await;
        Migrator::up(&db.conn, None).await.unwrap();
        db
    }

    pub(crate) fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for MemoryDatabase {
    async fn connect(&self) -> Result<DatabaseConnection, Error> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.conn.clone())
    }

    async fn release(&self, _conn: DatabaseConnection) -> Result<(), Error> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A factory whose configuration never names a secret.
pub(crate) struct Unreachable;

#[async_trait]
impl ConnectionFactory for Unreachable {
    async fn connect(&self) -> Result<DatabaseConnection, Error> {
        Err(Error::MissingSecretArn)
    }
}

/// Wraps a [`MemoryDatabase`] whose connections fail to be given back.
pub(crate) struct BrokenRelease(pub(crate) MemoryDatabase);

#[async_trait]
impl ConnectionFactory for BrokenRelease {
    async fn connect(&self) -> Result<DatabaseConnection, Error> {
        self.0.connect().await
    }

    async fn release(&self, conn: DatabaseConnection) -> Result<(), Error> {
        self.0.release(conn).await?;
        Err(Error::Database(sea_orm::DbErr::Custom(
            "pool already closed".to_string(),
        )))
    }
}
