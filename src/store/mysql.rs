// MySQL backend.
//
// Each unit of work wraps one sqlx transaction. Rows that are about to be
// checked and then written are read with `SELECT ... FOR UPDATE` so concurrent
// callers on the same order or invoice serialize inside MySQL.

use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::traits::{Store, UnitOfWork};
use crate::core::{AppError, Result};

/// Storage handle backed by a MySQL connection pool
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Create a store over an existing pool
    ///
    /// The pool's lifecycle stays with the caller.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Get the database connection pool
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

/// A unit of work holding an open MySQL transaction
pub struct MySqlUnitOfWork {
    pub(crate) tx: Transaction<'static, MySql>,
}

#[async_trait]
impl Store for MySqlStore {
    type Uow = MySqlUnitOfWork;

    async fn begin(&self) -> Result<MySqlUnitOfWork> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::storage(format!("Failed to start transaction: {}", e)))?;

        Ok(MySqlUnitOfWork { tx })
    }
}

#[async_trait]
impl UnitOfWork for MySqlUnitOfWork {
    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::storage(format!("Failed to commit transaction: {}", e)))
    }

    async fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| AppError::storage(format!("Failed to roll back transaction: {}", e)))
    }
}

/// Map a driver error to `AppError::Storage`, naming constraint violations
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::storage(format!(
                    "{}: duplicate entry ({})",
                    context,
                    db_err.message()
                ));
            }
            if db_err.is_foreign_key_violation() {
                return AppError::storage(format!(
                    "{}: foreign key constraint fails ({})",
                    context,
                    db_err.message()
                ));
            }
        }
        AppError::storage(format!("{}: {}", context, e))
    }
}

/// MySQL returns the AUTO_INCREMENT key as unsigned
pub(crate) fn inserted_id(result: &sqlx::mysql::MySqlQueryResult) -> i64 {
    result.last_insert_id() as i64
}
