// ABOUTME: Transaction management with RAII guards and retry with exponential backoff
// ABOUTME: Rolls back uncommitted transactions on drop and retries only lock or busy failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction management with RAII guards and retry patterns
//!
//! - `TransactionGuard`: wraps a `SQLx` transaction and rolls it back when
//!   dropped without `commit()`
//! - `retry_transaction`: re-runs a whole transaction after a transient lock
//!   or busy failure, with exponential backoff
//!
//! ```text
//! retry_transaction(move || async move {
//!     let mut guard = TransactionGuard::new(pool.begin().await?);
//!     sqlx::query("INSERT INTO training_programs ...").execute(guard.executor()?).await?;
//!     sqlx::query("INSERT INTO training_days ...").execute(guard.executor()?).await?;
//!     guard.commit().await?;
//!     Ok(program_id)
//! }, MAX_TRANSACTION_RETRIES).await
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use sqlx::{Database, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Errors that know whether re-running the transaction may succeed
pub trait RetryableError {
    /// True for transient lock, busy or pool-timeout failures
    fn is_retryable(&self) -> bool;
}

impl RetryableError for sqlx::Error {
    fn is_retryable(&self) -> bool {
        match self {
            Self::PoolTimedOut => true,
            Self::Database(db_error) => is_retryable_message(db_error.message()),
            _ => false,
        }
    }
}

impl RetryableError for AppError {
    fn is_retryable(&self) -> bool {
        self.code == ErrorCode::DatabaseError && is_retryable_message(&self.message)
    }
}

/// Retry a transaction operation if it fails with a transient error
///
/// `max_retries` counts re-runs after the first attempt. Non-retryable
/// errors (constraint violations, validation, not found) are returned
/// immediately.
///
/// # Exponential Backoff
/// - Retry 1: 20ms
/// - Retry 2: 40ms
/// - Retry 3: 80ms
///
/// # Errors
///
/// Returns the last error when the operation fails with a non-retryable
/// error or keeps failing after `max_retries` retries
pub async fn retry_transaction<F, Fut, T, E>(mut operation: F, max_retries: u32) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + fmt::Display,
{
    let mut retries = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && retries < max_retries => {
                retries += 1;
                let backoff_ms = 10_u64 << retries;
                warn!(
                    retry = retries,
                    max_retries = max_retries,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "Transaction failed with retryable error, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => {
                if e.is_retryable() {
                    error!(
                        retries = retries,
                        error = %e,
                        "Transaction failed after max retries"
                    );
                }
                return Err(e);
            }
        }
    }
}

/// Classify a database error message
///
/// `SQLite` reports contention as "database is locked" or "database table is
/// locked" (`SQLITE_BUSY` / `SQLITE_LOCKED`). Constraint failures never retry.
fn is_retryable_message(message: &str) -> bool {
    let lower = message.to_lowercase();

    if lower.contains("constraint") {
        return false;
    }

    lower.contains("locked")
        || lower.contains("busy")
        || lower.contains("timed out")
        || lower.contains("timeout")
}

/// RAII guard for database transactions ensuring automatic rollback on drop
///
/// If an error occurs before `commit()`, the guard is dropped and the
/// transaction is rolled back by `SQLx`.
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
    committed: bool,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Create a new transaction guard from an existing `SQLx` transaction
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        debug!("TransactionGuard created - transaction will auto-rollback if not committed");
        Self {
            transaction: Some(transaction),
            committed: false,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction was already consumed or the
    /// commit fails
    pub async fn commit(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.commit()
                    .await
                    .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
                self.committed = true;
                debug!("TransactionGuard committed successfully");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot commit",
            )),
        }
    }

    /// Get the underlying connection for executing queries
    ///
    /// # Errors
    ///
    /// Returns an error if the guard is used after commit or rollback
    pub fn executor(&mut self) -> AppResult<&mut <DB as Database>::Connection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit/rollback")
        })
    }
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() && !self.committed {
            warn!("TransactionGuard dropped without commit - transaction will be rolled back");
        }
    }
}
