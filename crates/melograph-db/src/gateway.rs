//! Scoped access to a pooled connection.
//!
//! A [`Gateway`] is checked out for one batch of statements and gives the
//! connection back when it goes out of scope, whether the batch succeeded
//! or failed. Handlers therefore never hold a connection across an await
//! point or leak one on an error path.

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Params, Row};
use thiserror::Error;

use crate::pool::DbPool;

/// A live connection checked out from the pool for the current scope.
pub struct Gateway {
    conn: PooledConnection<SqliteConnectionManager>,
}

/// Errors produced while acquiring a connection or running statements.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The pool could not hand out a connection.
    #[error("failed to check out a database connection: {0}")]
    Checkout(#[from] r2d2::Error),

    /// Statement preparation or execution failed.
    #[error("statement failed: {0}")]
    Statement(#[from] rusqlite::Error),
}

impl Gateway {
    /// Checks a connection out of the pool.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Checkout` when the pool is exhausted past its
    /// wait timeout or the underlying connection cannot be opened.
    pub fn acquire(pool: &DbPool) -> Result<Self, GatewayError> {
        Ok(Self { conn: pool.get()? })
    }

    /// Runs a SELECT statement and maps every row through `map_row`.
    ///
    /// Rows come back in statement order. An empty result set is `Ok` with
    /// an empty vector, not an error.
    pub fn select<T, P, F>(&self, sql: &str, params: P, map_row: F) -> Result<Vec<T>, GatewayError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let mapped = stmt.query_map(params, map_row)?;

        let mut rows = Vec::new();
        for row in mapped {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Runs an INSERT carrying a `RETURNING` clause and yields the generated
    /// row identifier.
    ///
    /// `Ok(None)` means the store produced no identifier: either the
    /// statement inserted nothing, or a constraint rejected the row. The
    /// caller decides what an absent identifier means; it is not an error at
    /// this layer.
    pub fn insert_returning_id<P>(&self, sql: &str, params: P) -> Result<Option<i64>, GatewayError>
    where
        P: Params,
    {
        match self
            .conn
            .query_row(sql, params, |row| row.get(0))
            .optional()
        {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(None)
            }
            Err(e) => Err(GatewayError::Statement(e)),
        }
    }
}
