//! Transactional unit of work over one pooled connection.
//!
//! A unit of work checks out a single connection, opens a transaction and
//! runs the supplied callback against it. `Ok` commits; `Err` rolls back and
//! hands the callback's own error back to the caller. Failures are logged
//! here so repositories only decide what the error means.
//!
//! If the callback panics the pooled connection is dropped while still inside
//! the transaction. The pool discards such connections and PostgreSQL rolls
//! the transaction back when the session closes.

use std::fmt;

use diesel_async::scoped_futures::ScopedBoxFuture;
use diesel_async::{AsyncConnection, AsyncPgConnection, TransactionManager};
use tracing::{debug, error, warn};

use super::pool::{DbPool, PoolError};

type PgTransactionManager = <AsyncPgConnection as AsyncConnection>::TransactionManager;

/// Failures raised by the unit of work itself rather than by its callback.
#[derive(Debug, thiserror::Error)]
pub enum UnitOfWorkError {
    /// No connection could be checked out.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// `BEGIN` failed.
    #[error("failed to begin transaction: {0}")]
    Begin(#[source] diesel::result::Error),
    /// `COMMIT` failed; the transaction has been rolled back.
    #[error("failed to commit transaction: {0}")]
    Commit(#[source] diesel::result::Error),
}

/// Scoped transaction runner bound to a pool.
///
/// # Examples
///
/// ```rust,no_run
/// use bookhub::outbound::persistence::{DbPool, PoolConfig, UnitOfWork, UnitOfWorkError};
/// use diesel_async::RunQueryDsl;
/// use diesel_async::scoped_futures::ScopedFutureExt;
///
/// #[derive(Debug)]
/// struct PurgeError(String);
///
/// impl From<UnitOfWorkError> for PurgeError {
///     fn from(err: UnitOfWorkError) -> Self {
///         Self(err.to_string())
///     }
/// }
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = DbPool::new(PoolConfig::new("postgres://localhost/bookhub")).await?;
/// let purged = UnitOfWork::new(&pool, "purge_lost_orders")
///     .run(|conn| {
///         async move {
///             diesel::sql_query("DELETE FROM orders WHERE status = 'lost'")
///                 .execute(conn)
///                 .await
///                 .map_err(|err| PurgeError(err.to_string()))
///         }
///         .scope_boxed()
///     })
///     .await
///     .map_err(|err| err.0)?;
/// # let _ = purged;
/// # Ok(())
/// # }
/// ```
pub struct UnitOfWork<'p> {
    pool: &'p DbPool,
    operation: &'static str,
}

impl<'p> UnitOfWork<'p> {
    /// Prepare a unit of work. `operation` labels log events.
    pub fn new(pool: &'p DbPool, operation: &'static str) -> Self {
        Self { pool, operation }
    }

    /// Run `callback` inside a transaction on a freshly checked-out connection.
    ///
    /// Exactly one of commit or rollback is attempted. A callback error is
    /// returned unchanged even if the rollback also fails.
    pub async fn run<'a, R, E, F>(self, callback: F) -> Result<R, E>
    where
        F: for<'r> FnOnce(&'r mut AsyncPgConnection) -> ScopedBoxFuture<'a, 'r, Result<R, E>>
            + Send
            + 'a,
        E: From<UnitOfWorkError> + fmt::Debug + Send + 'a,
        R: Send + 'a,
    {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| E::from(UnitOfWorkError::Pool(err)))?;
        run_in_transaction(&mut conn, self.operation, callback).await
    }
}

async fn run_in_transaction<'a, R, E, F>(
    conn: &mut AsyncPgConnection,
    operation: &'static str,
    callback: F,
) -> Result<R, E>
where
    F: for<'r> FnOnce(&'r mut AsyncPgConnection) -> ScopedBoxFuture<'a, 'r, Result<R, E>>
        + Send
        + 'a,
    E: From<UnitOfWorkError> + fmt::Debug + Send + 'a,
    R: Send + 'a,
{
    PgTransactionManager::begin_transaction(conn)
        .await
        .map_err(|err| E::from(UnitOfWorkError::Begin(err)))?;

    match callback(&mut *conn).await {
        Ok(value) => {
            // A failed top-level COMMIT is rolled back by the transaction manager.
            PgTransactionManager::commit_transaction(conn)
                .await
                .map_err(|err| {
                    error!(operation, error = %err, "unit of work commit failed");
                    E::from(UnitOfWorkError::Commit(err))
                })?;
            debug!(operation, "unit of work committed");
            Ok(value)
        }
        Err(failure) => {
            error!(operation, error = ?failure, "unit of work failed; rolling back");
            if let Err(rollback_error) = PgTransactionManager::rollback_transaction(conn).await {
                warn!(
                    operation,
                    error = %rollback_error,
                    "rollback failed; connection will be discarded"
                );
            }
            Err(failure)
        }
    }
}
