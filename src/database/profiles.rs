// ABOUTME: Profile storage and the account-provisioning hook
// ABOUTME: Creates exactly one profile per registered account and cascades account deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::{info, warn};

use super::now_timestamp;
use crate::errors::{AppError, AppResult};
use crate::models::{lookup_id, NewAccount, Profile, Role};

/// Look up the role of a profile on any executor (pool or open transaction)
///
/// # Errors
///
/// Returns the database error, or a decode error for a stored role outside
/// the check constraint
pub async fn role_of<'e, E>(executor: E, profile_id: &str) -> Result<Option<Role>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT role FROM profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_optional(executor)
        .await?;

    row.map(|row| {
        let role: String = row.try_get("role")?;
        role.parse::<Role>().map_err(|e| sqlx::Error::Decode(e.into()))
    })
    .transpose()
}

/// Map a `profiles` row
///
/// # Errors
///
/// Returns an error if a column is missing or the role is unknown
pub fn profile_from_row(row: &SqliteRow) -> AppResult<Profile> {
    let role: String = row.try_get("role")?;
    Ok(Profile {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        role: role
            .parse::<Role>()
            .map_err(|e| AppError::database(format!("Corrupt profile role: {e}")))?,
        created_at: row.try_get("created_at")?,
    })
}

/// Profile database operations
pub struct ProfilesManager {
    pool: SqlitePool,
}

impl ProfilesManager {
    /// Create a new profiles manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the profile for a newly registered account.
    ///
    /// The role comes from registration metadata and is validated before the
    /// insert; the table's check constraint backs this up. A missing or
    /// unknown role fails the registration instead of leaving an account
    /// without a profile.
    ///
    /// # Errors
    ///
    /// - invalid input when id, email, name or role is missing or malformed
    /// - already exists when the id or email is taken
    /// - database error for anything else
    pub async fn provision_profile(&self, account: &NewAccount) -> AppResult<Profile> {
        let validated = account.validate().map_err(|e| {
            warn!(account_id = %account.id, error = %e, "Rejected account provisioning");
            AppError::invalid_input(e.to_string())
        })?;

        let profile = Profile {
            id: validated.id,
            full_name: validated.full_name,
            email: validated.email,
            role: validated.role,
            created_at: now_timestamp(),
        };

        sqlx::query(
            r"
            INSERT INTO profiles (id, full_name, email, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&profile.id)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(profile.role.as_str())
        .bind(&profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(account_id = %profile.id, error = %e, "Profile insert failed");
            AppError::from(e)
        })?;

        info!(profile_id = %profile.id, role = %profile.role, "Provisioned profile");
        Ok(profile)
    }

    /// Get a profile by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_profile(&self, profile_id: &str) -> AppResult<Option<Profile>> {
        let profile_id = lookup_id(profile_id);
        let profile_id = profile_id.as_str();
        let row = sqlx::query(
            "SELECT id, full_name, email, role, created_at FROM profiles WHERE id = $1",
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    /// Get a profile by email, ignoring case and surrounding whitespace
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_profile_by_email(&self, email: &str) -> AppResult<Option<Profile>> {
        let row = sqlx::query(
            "SELECT id, full_name, email, role, created_at FROM profiles WHERE email = $1",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    /// Delete a profile and, through cascades, everything it owns
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_profile(&self, profile_id: &str) -> AppResult<bool> {
        let profile_id = lookup_id(profile_id);
        let profile_id = profile_id.as_str();
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(profile_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete profile: {e}")))?;

        if result.rows_affected() > 0 {
            info!(profile_id = %profile_id, "Deleted profile");
        }
        Ok(result.rows_affected() > 0)
    }
}
