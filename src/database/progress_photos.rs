// ABOUTME: Append-only progress photos uploaded by clients
// ABOUTME: Readable by the client and by trainers linked to that client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::now_timestamp;
use super::profiles::role_of;
use crate::context::CallerContext;
use crate::errors::{AppError, AppResult};
use crate::models::numeric::{optional_text, required_text};
use crate::models::{lookup_id, Role};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stored progress photo reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressPhoto {
    /// Photo id
    pub id: String,
    /// Owning client
    pub client_id: String,
    /// Location of the stored image
    pub photo_url: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date_taken: String,
    /// Notes
    pub notes: Option<String>,
    /// RFC 3339 upload time
    pub created_at: String,
}

/// Input for a new progress photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProgressPhoto {
    /// Location of the stored image
    pub photo_url: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date_taken: String,
    /// Notes
    #[serde(default)]
    pub notes: Option<String>,
}

fn photo_from_row(row: &SqliteRow) -> AppResult<ProgressPhoto> {
    Ok(ProgressPhoto {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        photo_url: row.try_get("photo_url")?,
        date_taken: row.try_get("date_taken")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Progress photo operations
pub struct ProgressPhotosManager {
    pool: SqlitePool,
}

impl ProgressPhotosManager {
    /// Create a new progress photos manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a photo for the calling client
    ///
    /// # Errors
    ///
    /// Returns permission denied for non-clients and invalid input for a
    /// blank URL or a date that is not `YYYY-MM-DD`
    pub async fn add_photo(&self, caller: &CallerContext, photo: &NewProgressPhoto) -> AppResult<ProgressPhoto> {
        if role_of(&self.pool, &caller.profile_id).await? != Some(Role::Client) {
            return Err(AppError::permission_denied("Only clients can add progress photos"));
        }

        let photo_url = required_text(&photo.photo_url, "photo_url")
            .map_err(|e| AppError::invalid_input(e.to_string()))?;
        let date_taken = NaiveDate::parse_from_str(photo.date_taken.trim(), DATE_FORMAT)
            .map_err(|_| {
                AppError::invalid_input(format!(
                    "date_taken must be YYYY-MM-DD, got '{}'",
                    photo.date_taken
                ))
            })?;

        let stored = ProgressPhoto {
            id: Uuid::new_v4().to_string(),
            client_id: caller.profile_id.clone(),
            photo_url,
            date_taken: date_taken.format(DATE_FORMAT).to_string(),
            notes: optional_text(photo.notes.as_deref()),
            created_at: now_timestamp(),
        };

        sqlx::query(
            r"
            INSERT INTO progress_photos (id, client_id, photo_url, date_taken, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&stored.id)
        .bind(&stored.client_id)
        .bind(&stored.photo_url)
        .bind(&stored.date_taken)
        .bind(&stored.notes)
        .bind(&stored.created_at)
        .execute(&self.pool)
        .await?;

        info!(photo_id = %stored.id, client_id = %stored.client_id, "Added progress photo");
        Ok(stored)
    }

    /// Photos of a client, oldest date first; visible to the client and to
    /// trainers linked to them
    ///
    /// # Errors
    ///
    /// Returns permission denied for any other caller
    pub async fn list_photos(&self, caller: &CallerContext, client_id: &str) -> AppResult<Vec<ProgressPhoto>> {
        let client_id = lookup_id(client_id);
        let client_id = client_id.as_str();
        if caller.profile_id != client_id {
            let linked = sqlx::query(
                "SELECT 1 FROM client_links WHERE trainer_id = $1 AND client_id = $2",
            )
            .bind(&caller.profile_id)
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
            if !linked {
                return Err(AppError::permission_denied(
                    "Progress photos are visible to the client and their trainers only",
                ));
            }
        }

        let rows = sqlx::query(
            r"
            SELECT id, client_id, photo_url, date_taken, notes, created_at
            FROM progress_photos
            WHERE client_id = $1
            ORDER BY date_taken, created_at, rowid
            ",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(photo_from_row).collect()
    }
}
