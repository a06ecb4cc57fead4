//! Transactional store
//!
//! A `TransactionalStore` owns the database handle for one logical unit of
//! work. Statements run on the active transaction when one is open, otherwise
//! on a pooled connection that is released as soon as the statement returns.
//!
//! Release is guaranteed on every exit path:
//! - `commit` and `rollback` consume the transaction
//! - dropping the store (e.g. a cancelled request) drops the transaction,
//!   which sqlx rolls back before returning the connection to the pool

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgConnection, PgPool, PgQueryResult, PgRow, Postgres};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, Transaction};

use crate::response::ResponseData;

/// Storage failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to acquire a database connection: {0}")]
    Acquire(#[source] sqlx::Error),

    #[error("Something went wrong on trying to start a transaction: {0}")]
    TransactionStart(#[source] sqlx::Error),

    #[error("A transaction is already active on this store")]
    TransactionActive,

    #[error("No active transaction")]
    NoTransaction,

    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Something went wrong on trying to commit the transaction: {0}")]
    TransactionCommit(#[source] sqlx::Error),

    #[error("Transaction commit timed out after {0:?}")]
    CommitTimeout(Duration),
}

impl StoreError {
    /// True when the database rejected a write on a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Query(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }

    /// Stable name for response envelopes
    pub fn name(&self) -> &'static str {
        match self {
            Self::Acquire(_) => "CONNECTION_FAILED",
            Self::TransactionStart(_) => "TRANSACTION_START_FAILED",
            Self::TransactionActive => "TRANSACTION_ACTIVE",
            Self::NoTransaction => "NO_TRANSACTION",
            Self::Query(_) => "QUERY_FAILED",
            Self::TransactionCommit(_) | Self::CommitTimeout(_) => "TRANSACTION_COMMIT_FAILED",
        }
    }
}

/// A connection handed out by [`TransactionalStore::acquire`]
pub enum Connection<'a> {
    /// Borrowed from the store's open transaction
    Transaction(&'a mut PgConnection),
    /// Checked out of the pool; returned when dropped
    Pooled(PoolConnection<Postgres>),
}

impl Deref for Connection<'_> {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        match self {
            Self::Transaction(conn) => &**conn,
            Self::Pooled(conn) => &**conn,
        }
    }
}

impl DerefMut for Connection<'_> {
    fn deref_mut(&mut self) -> &mut PgConnection {
        match self {
            Self::Transaction(conn) => &mut **conn,
            Self::Pooled(conn) => &mut **conn,
        }
    }
}

/// Connection and transaction handle for one logical unit of work.
///
/// At most one transaction is open per store.
pub struct TransactionalStore {
    pool: PgPool,
    active: Option<Transaction<'static, Postgres>>,
    commit_timeout: Duration,
}

impl TransactionalStore {
    pub fn new(pool: PgPool, commit_timeout: Duration) -> Self {
        Self {
            pool,
            active: None,
            commit_timeout,
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.active.is_some()
    }

    /// The active transaction's connection, or a fresh pooled one.
    ///
    /// Waiting for the pool is bounded by its acquire timeout.
    pub async fn acquire(&mut self) -> Result<Connection<'_>, StoreError> {
        if self.active.is_none() {
            let conn = self.pool.acquire().await.map_err(StoreError::Acquire)?;
            return Ok(Connection::Pooled(conn));
        }

        match self.active.as_mut() {
            Some(tx) => Ok(Connection::Transaction(&mut **tx)),
            None => Err(StoreError::NoTransaction),
        }
    }

    /// Start a transaction; later statements on this store run inside it
    pub async fn begin(&mut self) -> Result<(), StoreError> {
        if self.active.is_some() {
            return Err(StoreError::TransactionActive);
        }

        match self.pool.begin().await {
            Ok(tx) => {
                self.active = Some(tx);
                Ok(())
            }
            Err(e) => {
                let error = match e {
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StoreError::Acquire(e),
                    other => StoreError::TransactionStart(other),
                };
                self.rollback(&error, "Something went wrong on trying to start a transaction")
                    .await;
                Err(error)
            }
        }
    }

    pub async fn execute<'q>(
        &mut self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Result<PgQueryResult, StoreError> {
        let mut conn = self.acquire().await?;
        Ok(query.execute(&mut *conn).await?)
    }

    pub async fn fetch_one<'q>(
        &mut self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Result<PgRow, StoreError> {
        let mut conn = self.acquire().await?;
        Ok(query.fetch_one(&mut *conn).await?)
    }

    pub async fn fetch_optional_as<'q, T>(
        &mut self,
        query: QueryAs<'q, Postgres, T, PgArguments>,
    ) -> Result<Option<T>, StoreError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut conn = self.acquire().await?;
        Ok(query.fetch_optional(&mut *conn).await?)
    }

    /// Commit the active transaction and release its connection.
    ///
    /// A failed or timed-out commit runs the rollback path before returning.
    pub async fn commit(&mut self) -> Result<bool, StoreError> {
        let Some(tx) = self.active.take() else {
            return Err(StoreError::NoTransaction);
        };

        // The transaction moves into the commit future; if the commit fails or
        // the timeout drops the future, sqlx rolls the connection back on drop.
        let error = match tokio::time::timeout(self.commit_timeout, tx.commit()).await {
            Ok(Ok(())) => return Ok(true),
            Ok(Err(e)) => StoreError::TransactionCommit(e),
            Err(_) => StoreError::CommitTimeout(self.commit_timeout),
        };

        self.rollback(&error, "Something went wrong on trying to commit the transaction")
            .await;
        Err(error)
    }

    /// Roll back the active transaction, if any, and release its connection.
    ///
    /// Always succeeds from the caller's point of view and returns the failure
    /// envelope describing `error`.
    pub async fn rollback<E>(&mut self, error: &E, message: &str) -> ResponseData<()>
    where
        E: fmt::Display + ?Sized,
    {
        if let Some(tx) = self.active.take() {
            if let Err(e) = tx.rollback().await {
                // The failed transaction was dropped with the error, which
                // returns its connection to the pool
                tracing::error!(error = %e, "Transaction rollback failed");
            }
        }

        tracing::warn!(error = %error, "{}", message);
        ResponseData::failure(error.to_string(), message)
    }
}

impl Drop for TransactionalStore {
    fn drop(&mut self) {
        if self.active.is_some() {
            tracing::warn!("Store dropped with an open transaction, rolling back");
        }
    }
}
