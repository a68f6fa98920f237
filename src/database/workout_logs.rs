// ABOUTME: Append-only workout set logs recorded by clients against program assignments
// ABOUTME: Only the program's client may log; the client and the trainer may read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::now_timestamp;
use crate::context::CallerContext;
use crate::errors::{AppError, AppResult};
use crate::models::lookup_id;

/// One logged set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    /// Log id
    pub id: String,
    /// Assignment the set belongs to
    pub exercise_assignment_id: String,
    /// Client who performed it
    pub client_id: String,
    /// 1-based set number
    pub set_number: i64,
    /// Reps done
    pub reps_completed: i64,
    /// Load, unit left to the trainer
    pub weight: Option<f64>,
    /// RFC 3339 time of logging
    pub logged_at: String,
}

/// Input for a logged set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkoutLog {
    /// Assignment id
    pub exercise_assignment_id: String,
    /// 1-based set number
    pub set_number: i64,
    /// Reps done
    pub reps_completed: i64,
    /// Optional load
    #[serde(default)]
    pub weight: Option<f64>,
}

impl NewWorkoutLog {
    fn validate(&self) -> AppResult<()> {
        if self.set_number < 1 {
            return Err(AppError::invalid_input("set_number must be at least 1"));
        }
        if self.reps_completed < 0 {
            return Err(AppError::invalid_input("reps_completed must not be negative"));
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AppError::invalid_input(
                    "weight must be a finite number of at least 0",
                ));
            }
        }
        Ok(())
    }
}

fn log_from_row(row: &SqliteRow) -> AppResult<WorkoutLog> {
    Ok(WorkoutLog {
        id: row.try_get("id")?,
        exercise_assignment_id: row.try_get("exercise_assignment_id")?,
        client_id: row.try_get("client_id")?,
        set_number: row.try_get("set_number")?,
        reps_completed: row.try_get("reps_completed")?,
        weight: row.try_get("weight")?,
        logged_at: row.try_get("logged_at")?,
    })
}

/// Workout log operations
pub struct WorkoutLogsManager {
    pool: SqlitePool,
}

impl WorkoutLogsManager {
    /// Create a new workout logs manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Trainer and client of the program owning an assignment
    async fn assignment_parties(&self, assignment_id: &str) -> AppResult<Option<(String, String)>> {
        let row = sqlx::query(
            r"
            SELECT p.trainer_id, p.client_id
            FROM exercise_assignments a
            JOIN training_days d ON d.id = a.day_id
            JOIN training_programs p ON p.id = d.program_id
            WHERE a.id = $1
            ",
        )
        .bind(assignment_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> AppResult<(String, String)> {
            Ok((row.try_get("trainer_id")?, row.try_get("client_id")?))
        })
        .transpose()
    }

    /// Record a set performed by the calling client
    ///
    /// # Errors
    ///
    /// - invalid input for out-of-range numbers
    /// - not found when the assignment does not exist
    /// - permission denied when the caller is not the program's client
    pub async fn log_set(&self, caller: &CallerContext, entry: &NewWorkoutLog) -> AppResult<WorkoutLog> {
        entry.validate()?;
        let assignment_id = lookup_id(&entry.exercise_assignment_id);

        let (_, client_id) = self
            .assignment_parties(&assignment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise assignment"))?;
        if client_id != caller.profile_id {
            return Err(AppError::permission_denied(
                "Only the program's client can log sets",
            ));
        }

        let log = WorkoutLog {
            id: Uuid::new_v4().to_string(),
            exercise_assignment_id: assignment_id,
            client_id,
            set_number: entry.set_number,
            reps_completed: entry.reps_completed,
            weight: entry.weight,
            logged_at: now_timestamp(),
        };

        sqlx::query(
            r"
            INSERT INTO workout_logs
                (id, exercise_assignment_id, client_id, set_number, reps_completed, weight, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&log.id)
        .bind(&log.exercise_assignment_id)
        .bind(&log.client_id)
        .bind(log.set_number)
        .bind(log.reps_completed)
        .bind(log.weight)
        .bind(&log.logged_at)
        .execute(&self.pool)
        .await?;

        info!(
            log_id = %log.id,
            assignment_id = %log.exercise_assignment_id,
            set_number = log.set_number,
            "Logged workout set"
        );
        Ok(log)
    }

    /// Logs for an assignment, oldest first; visible to the program's client
    /// and trainer
    ///
    /// # Errors
    ///
    /// Returns not found when the assignment does not exist or is not
    /// visible to the caller
    pub async fn list_logs(&self, caller: &CallerContext, assignment_id: &str) -> AppResult<Vec<WorkoutLog>> {
        let assignment_id = lookup_id(assignment_id);
        let assignment_id = assignment_id.as_str();
        let visible = self
            .assignment_parties(assignment_id)
            .await?
            .is_some_and(|(trainer_id, client_id)| {
                trainer_id == caller.profile_id || client_id == caller.profile_id
            });
        if !visible {
            return Err(AppError::not_found("Exercise assignment"));
        }

        let rows = sqlx::query(
            r"
            SELECT id, exercise_assignment_id, client_id, set_number, reps_completed, weight, logged_at
            FROM workout_logs
            WHERE exercise_assignment_id = $1
            ORDER BY logged_at, rowid
            ",
        )
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(log_from_row).collect()
    }
}
