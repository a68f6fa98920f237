// ABOUTME: Trainer to client links including the trainer-adds-client operation
// ABOUTME: Uses insert-if-absent so duplicate and concurrent adds resolve to tagged outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sqlx::{Row, Sqlite, SqlitePool};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::now_timestamp;
use super::profiles::{profile_from_row, role_of};
use crate::context::CallerContext;
use crate::errors::{AppError, AppResult};
use crate::models::{lookup_id, AddClientOutcome, Profile, Role};

/// True when the two profiles are linked in either direction
///
/// # Errors
///
/// Returns the database error
pub async fn linked_either_way<'e, E>(executor: E, a: &str, b: &str) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r"
        SELECT 1 FROM client_links
        WHERE (trainer_id = $1 AND client_id = $2) OR (trainer_id = $2 AND client_id = $1)
        LIMIT 1
        ",
    )
    .bind(a)
    .bind(b)
    .fetch_optional(executor)
    .await?;
    Ok(row.is_some())
}

/// Client link database operations
pub struct ClientLinksManager {
    pool: SqlitePool,
}

impl ClientLinksManager {
    /// Create a new client links manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add the client with `email` to the calling trainer's roster.
    ///
    /// Never fails: every branch, including unexpected database errors, is a
    /// value of [`AddClientOutcome`].
    pub async fn add_client_by_email(
        &self,
        caller: &CallerContext,
        email: &str,
    ) -> AddClientOutcome {
        match self.try_add_client(caller, email).await {
            Ok(outcome) => {
                match &outcome {
                    AddClientOutcome::Success { client_id } => {
                        info!(trainer_id = %caller.profile_id, client_id = %client_id, "Client added");
                    }
                    other => {
                        warn!(
                            trainer_id = %caller.profile_id,
                            outcome = ?other.status(),
                            "Client not added"
                        );
                    }
                }
                outcome
            }
            Err(e) => {
                error!(trainer_id = %caller.profile_id, error = %e, "Add client failed");
                AddClientOutcome::UnexpectedError {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn try_add_client(
        &self,
        caller: &CallerContext,
        email: &str,
    ) -> Result<AddClientOutcome, sqlx::Error> {
        if role_of(&self.pool, &caller.profile_id).await? != Some(Role::Trainer) {
            return Ok(AddClientOutcome::AccessDenied);
        }

        let email = email.trim();
        if email.is_empty() {
            return Ok(AddClientOutcome::NotFound);
        }

        let Some(target) = sqlx::query("SELECT id, role FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(AddClientOutcome::NotFound);
        };

        let client_id: String = target.try_get("id")?;
        let role: String = target.try_get("role")?;
        if role != Role::Client.as_str() {
            return Ok(AddClientOutcome::WrongRole);
        }

        let inserted = sqlx::query(
            r"
            INSERT INTO client_links (id, trainer_id, client_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (trainer_id, client_id) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&caller.profile_id)
        .bind(&client_id)
        .bind(now_timestamp())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(result) if result.rows_affected() == 0 => Ok(AddClientOutcome::AlreadyExists),
            Ok(_) => Ok(AddClientOutcome::Success { client_id }),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                Ok(AddClientOutcome::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    /// List the calling trainer's clients, oldest link first
    ///
    /// # Errors
    ///
    /// Returns permission denied for non-trainers, or a database error
    pub async fn list_clients(&self, caller: &CallerContext) -> AppResult<Vec<Profile>> {
        if role_of(&self.pool, &caller.profile_id).await? != Some(Role::Trainer) {
            return Err(AppError::permission_denied("Only trainers have clients"));
        }

        let rows = sqlx::query(
            r"
            SELECT p.id, p.full_name, p.email, p.role, p.created_at
            FROM client_links l
            JOIN profiles p ON p.id = l.client_id
            WHERE l.trainer_id = $1
            ORDER BY l.created_at, l.rowid
            ",
        )
        .bind(&caller.profile_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(profile_from_row).collect()
    }

    /// Remove a client from the calling trainer's roster
    ///
    /// # Errors
    ///
    /// Returns not found when no such link exists
    pub async fn remove_client(&self, caller: &CallerContext, client_id: &str) -> AppResult<()> {
        let client_id = lookup_id(client_id);
        let client_id = client_id.as_str();
        let result = sqlx::query("DELETE FROM client_links WHERE trainer_id = $1 AND client_id = $2")
            .bind(&caller.profile_id)
            .bind(client_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Client link"));
        }
        info!(trainer_id = %caller.profile_id, client_id = %client_id, "Client removed");
        Ok(())
    }

    /// True when `trainer_id` coaches `client_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn is_linked(&self, trainer_id: &str, client_id: &str) -> AppResult<bool> {
        let client_id = lookup_id(client_id);
        let client_id = client_id.as_str();
        let trainer_id = lookup_id(trainer_id);
        let trainer_id = trainer_id.as_str();
        let row = sqlx::query("SELECT 1 FROM client_links WHERE trainer_id = $1 AND client_id = $2")
            .bind(trainer_id)
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
