// ABOUTME: Shared failure classification and authorization for composite-create transactions
// ABOUTME: Maps database errors to tagged reasons and checks the trainer and client of a tree
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use sqlx::SqliteConnection;

use super::profiles::role_of;
use super::transactions::RetryableError;
use crate::context::CallerContext;
use crate::errors::AppError;
use crate::models::{CreateTreeOutcome, FailureReason, Role};

/// Why a tree transaction stopped; converted into [`CreateTreeOutcome::Failed`]
#[derive(Debug)]
pub struct TreeFailure {
    reason: FailureReason,
    message: String,
    retryable: bool,
}

impl TreeFailure {
    /// Non-retryable failure
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            retryable: false,
        }
    }

    /// Classify a database error raised while writing `what`
    pub fn from_sqlx(what: &str, error: &sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = error {
            if db_error.is_unique_violation()
                || db_error.is_foreign_key_violation()
                || db_error.is_check_violation()
            {
                return Self::new(
                    FailureReason::ConstraintViolation,
                    format!("{what} rejected: {}", db_error.message()),
                );
            }
        }
        Self {
            reason: FailureReason::Database,
            message: format!("Failed to write {what}: {error}"),
            retryable: error.is_retryable(),
        }
    }

    /// Reason tag
    #[must_use]
    pub const fn reason(&self) -> FailureReason {
        self.reason
    }
}

impl From<AppError> for TreeFailure {
    fn from(error: AppError) -> Self {
        Self {
            reason: FailureReason::Database,
            retryable: error.is_retryable(),
            message: error.message,
        }
    }
}

impl From<TreeFailure> for CreateTreeOutcome {
    fn from(failure: TreeFailure) -> Self {
        Self::Failed {
            reason: failure.reason,
            message: failure.message,
        }
    }
}

impl RetryableError for TreeFailure {
    fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl fmt::Display for TreeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.reason, self.message)
    }
}

/// Check, inside the open transaction, that the caller is a trainer and the
/// target profile exists with role client
///
/// # Errors
///
/// Returns `AccessDenied`, `ClientNotFound` or `InvalidClient` failures, or a
/// classified database failure
pub async fn authorize_tree(
    conn: &mut SqliteConnection,
    caller: &CallerContext,
    client_id: &str,
    entity: &str,
) -> Result<(), TreeFailure> {
    let caller_role = role_of(&mut *conn, &caller.profile_id)
        .await
        .map_err(|e| TreeFailure::from_sqlx("caller profile", &e))?;
    if caller_role != Some(Role::Trainer) {
        return Err(TreeFailure::new(
            FailureReason::AccessDenied,
            format!("Only trainers can create {entity}s"),
        ));
    }

    match role_of(&mut *conn, client_id)
        .await
        .map_err(|e| TreeFailure::from_sqlx("client profile", &e))?
    {
        None => Err(TreeFailure::new(
            FailureReason::ClientNotFound,
            format!("Client {client_id} not found"),
        )),
        Some(Role::Trainer) => Err(TreeFailure::new(
            FailureReason::InvalidClient,
            format!("Profile {client_id} is not a client"),
        )),
        Some(Role::Client) => Ok(()),
    }
}
