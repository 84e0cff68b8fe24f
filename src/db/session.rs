use std::future::Future;
use std::pin::Pin;

use lambda_runtime::tracing::{self, Level};
use sea_orm::{
    DatabaseConnection, DatabaseTransaction, DbErr, SqlErr, TransactionError, TransactionTrait,
};

use super::ConnectionFactory;
use crate::Error;

type BoxFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, DbErr>> + Send + 'c>>;

/// Runs `work` inside a transaction on a freshly acquired connection.
///
/// The transaction commits when `work` returns `Ok` and rolls back when it
/// returns `Err` or when the commit itself fails. Once a connection has been
/// acquired it is released exactly once, whichever way the unit of work ends.
pub async fn with_session<T, F>(factory: &dyn ConnectionFactory, work: F) -> Result<T, Error>
where
    T: Send,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, T> + Send,
{
    let conn = factory.connect().await?;
    let outcome = conn
        .transaction::<_, T, DbErr>(work)
        .await
        .map_err(|e| match e {
            TransactionError::Connection(err) | TransactionError::Transaction(err) => err,
        });
    finish(factory, conn, outcome).await
}

/// Same lifecycle as [`with_session`] without a transaction, for read-only
/// work that has nothing to commit.
pub async fn with_connection<T, F>(factory: &dyn ConnectionFactory, work: F) -> Result<T, Error>
where
    T: Send,
    F: for<'c> FnOnce(&'c DatabaseConnection) -> BoxFuture<'c, T> + Send,
{
    let conn = factory.connect().await?;
    let outcome = work(&conn).await;
    finish(factory, conn, outcome).await
}

/// Unique-index rejections are expected client errors and are reported by
/// the caller, so they stay out of the error log.
fn failure_level(err: &DbErr) -> Level {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Level::DEBUG,
        _ => Level::ERROR,
    }
}

async fn finish<T>(
    factory: &dyn ConnectionFactory,
    conn: DatabaseConnection,
    outcome: Result<T, DbErr>,
) -> Result<T, Error> {
    let released = factory.release(conn).await;
    let value = outcome.inspect_err(|e| {
        if failure_level(e) == Level::ERROR {
            tracing::error!("Unit of work failed: {}", e);
        } else {
            tracing::debug!("Unit of work rejected: {}", e);
        }
    })?;
    // The work already completed, so a failed release is not reported to the caller.
    if let Err(e) = released {
        tracing::warn!("Failed to release database connection: {}", e);
    }
    Ok(value)
}
