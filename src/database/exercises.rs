// ABOUTME: Exercise library with global entries and trainer-owned entries
// ABOUTME: A trainer sees global exercises plus the ones they created
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

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

/// Library exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Exercise id
    pub id: String,
    /// Display name
    pub name: String,
    /// How to perform it
    pub description: Option<String>,
    /// Demonstration video
    pub video_url: Option<String>,
    /// Owning trainer; `None` for the global library
    pub created_by: Option<String>,
    /// RFC 3339 creation time
    pub created_at: String,
}

/// Input for a new exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewExercise {
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Video URL
    #[serde(default)]
    pub video_url: Option<String>,
}

fn exercise_from_row(row: &SqliteRow) -> AppResult<Exercise> {
    Ok(Exercise {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        video_url: row.try_get("video_url")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Exercise library operations
pub struct ExercisesManager {
    pool: SqlitePool,
}

impl ExercisesManager {
    /// Create a new exercises manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an exercise owned by the calling trainer
    ///
    /// # Errors
    ///
    /// Returns permission denied for non-trainers and invalid input for a
    /// blank name
    pub async fn create_exercise(
        &self,
        caller: &CallerContext,
        exercise: &NewExercise,
    ) -> AppResult<Exercise> {
        if role_of(&self.pool, &caller.profile_id).await? != Some(Role::Trainer) {
            return Err(AppError::permission_denied("Only trainers can create exercises"));
        }
        self.insert(exercise, Some(&caller.profile_id)).await
    }

    /// Create a global library exercise (seeding)
    ///
    /// # Errors
    ///
    /// Returns invalid input for a blank name
    pub async fn create_global_exercise(&self, exercise: &NewExercise) -> AppResult<Exercise> {
        self.insert(exercise, None).await
    }

    async fn insert(&self, exercise: &NewExercise, owner: Option<&str>) -> AppResult<Exercise> {
        let name = required_text(&exercise.name, "name")
            .map_err(|e| AppError::invalid_input(e.to_string()))?;

        let created = Exercise {
            id: Uuid::new_v4().to_string(),
            name,
            description: optional_text(exercise.description.as_deref()),
            video_url: optional_text(exercise.video_url.as_deref()),
            created_by: owner.map(ToOwned::to_owned),
            created_at: now_timestamp(),
        };

        sqlx::query(
            r"
            INSERT INTO exercises (id, name, description, video_url, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&created.id)
        .bind(&created.name)
        .bind(&created.description)
        .bind(&created.video_url)
        .bind(&created.created_by)
        .bind(&created.created_at)
        .execute(&self.pool)
        .await?;

        info!(exercise_id = %created.id, name = %created.name, "Created exercise");
        Ok(created)
    }

    /// Exercises visible to the caller: the global library plus their own
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_exercises(&self, caller: &CallerContext) -> AppResult<Vec<Exercise>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, video_url, created_by, created_at
            FROM exercises
            WHERE created_by IS NULL OR created_by = $1
            ORDER BY name COLLATE NOCASE, rowid
            ",
        )
        .bind(&caller.profile_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(exercise_from_row).collect()
    }

    /// Get one exercise by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_exercise(&self, exercise_id: &str) -> AppResult<Option<Exercise>> {
        let exercise_id = lookup_id(exercise_id);
        let row = sqlx::query(
            r"
            SELECT id, name, description, video_url, created_by, created_at
            FROM exercises WHERE id = $1
            ",
        )
        .bind(&exercise_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(exercise_from_row).transpose()
    }
}
