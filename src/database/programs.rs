// ABOUTME: Training programs and the all-or-nothing composite program creation transaction
// ABOUTME: Writes program, ordered days and ordered exercise assignments in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Training programs
//!
//! A program is a tree: program → days → exercise assignments. It is created
//! from one [`ProgramDocument`] inside a single transaction and deleted as a
//! unit through cascading foreign keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::composite::{authorize_tree, TreeFailure};
use super::now_timestamp;
use super::transactions::{retry_transaction, TransactionGuard};
use crate::constants::database::MAX_TRANSACTION_RETRIES;
use crate::context::CallerContext;
use crate::errors::{AppError, AppResult};
use crate::models::{
    lookup_id, CreateTreeOutcome, FailureReason, ProgramDocument, ValidatedProgram,
};

/// Program header row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingProgram {
    /// Program id
    pub id: String,
    /// Program name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Authoring trainer
    pub trainer_id: String,
    /// Target client
    pub client_id: String,
    /// RFC 3339 creation time
    pub created_at: String,
}

/// Program with its ordered days and assignments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramTree {
    /// Header
    #[serde(flatten)]
    pub program: TrainingProgram,
    /// Days by `day_order`, then insertion
    pub days: Vec<ProgramDay>,
}

/// One stored training day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDay {
    /// Day id
    pub id: String,
    /// Day name
    pub name: String,
    /// Ordering key
    pub day_order: i64,
    /// Assignments by `exercise_order`, then insertion
    pub exercises: Vec<ProgramAssignment>,
}

/// One stored exercise assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramAssignment {
    /// Assignment id, referenced by workout logs
    pub id: String,
    /// Exercise id
    pub exercise_id: String,
    /// Exercise name
    pub exercise_name: String,
    /// Sets
    pub sets: i64,
    /// Rep target
    pub reps: String,
    /// Rest seconds
    pub rest_period_seconds: Option<i64>,
    /// Ordering key
    pub exercise_order: i64,
    /// Notes
    pub notes: Option<String>,
}

fn program_from_row(row: &SqliteRow) -> AppResult<TrainingProgram> {
    Ok(TrainingProgram {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        trainer_id: row.try_get("trainer_id")?,
        client_id: row.try_get("client_id")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Training program operations
pub struct ProgramsManager {
    pool: SqlitePool,
}

impl ProgramsManager {
    /// Create a new programs manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a whole program tree atomically.
    ///
    /// The document is validated before any write. Inside one transaction
    /// the caller must be a trainer, the client must exist with role client,
    /// and every exercise must be global or created by the caller. Rows are
    /// inserted in input order. Any failure leaves no row from this call.
    /// Lock and busy failures re-run the whole transaction with backoff.
    #[instrument(skip(self, document), fields(caller = %caller.profile_id))]
    pub async fn create_program(
        &self,
        caller: &CallerContext,
        document: &ProgramDocument,
    ) -> CreateTreeOutcome {
        let program = match document.validate() {
            Ok(program) => program,
            Err(e) => {
                warn!(error = %e, "Program document rejected");
                return e.into();
            }
        };

        let program = &program;
        let result = retry_transaction(
            move || self.insert_program_tree(caller, program),
            MAX_TRANSACTION_RETRIES,
        )
        .await;

        match result {
            Ok(program_id) => {
                info!(
                    program_id = %program_id,
                    client_id = %program.client_id,
                    days = program.days.len(),
                    "Created program"
                );
                CreateTreeOutcome::Created { id: program_id }
            }
            Err(failure) => {
                if failure.reason() == FailureReason::Database {
                    error!(error = %failure, "Program creation failed");
                } else {
                    warn!(error = %failure, "Program creation rejected");
                }
                failure.into()
            }
        }
    }

    async fn insert_program_tree(
        &self,
        caller: &CallerContext,
        program: &ValidatedProgram,
    ) -> Result<String, TreeFailure> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TreeFailure::from_sqlx("transaction", &e))?;
        let mut guard = TransactionGuard::new(tx);
        let conn = guard.executor()?;

        authorize_tree(conn, caller, &program.client_id, "program").await?;

        let program_id = Uuid::new_v4().to_string();
        sqlx::query(
            r"
            INSERT INTO training_programs (id, name, description, trainer_id, client_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&program_id)
        .bind(&program.name)
        .bind(&program.description)
        .bind(&caller.profile_id)
        .bind(&program.client_id)
        .bind(now_timestamp())
        .execute(&mut *conn)
        .await
        .map_err(|e| TreeFailure::from_sqlx("program", &e))?;

        for (i, day) in program.days.iter().enumerate() {
            let day_path = format!("days[{i}]");
            let day_id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO training_days (id, program_id, name, day_order) VALUES ($1, $2, $3, $4)",
            )
            .bind(&day_id)
            .bind(&program_id)
            .bind(&day.name)
            .bind(day.day_order)
            .execute(&mut *conn)
            .await
            .map_err(|e| TreeFailure::from_sqlx(&day_path, &e))?;

            for (j, assignment) in day.exercises.iter().enumerate() {
                let path = format!("{day_path}.exercises[{j}]");

                let visible = sqlx::query(
                    "SELECT 1 FROM exercises WHERE id = $1 AND (created_by IS NULL OR created_by = $2)",
                )
                .bind(&assignment.exercise_id)
                .bind(&caller.profile_id)
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| TreeFailure::from_sqlx(&path, &e))?;
                if visible.is_none() {
                    return Err(TreeFailure::new(
                        FailureReason::ReferenceNotFound,
                        format!(
                            "{path}.exercise_id: exercise {} not found",
                            assignment.exercise_id
                        ),
                    ));
                }

                sqlx::query(
                    r"
                    INSERT INTO exercise_assignments
                        (id, day_id, exercise_id, sets, reps, rest_period_seconds, exercise_order, notes)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    ",
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&day_id)
                .bind(&assignment.exercise_id)
                .bind(assignment.sets)
                .bind(&assignment.reps)
                .bind(assignment.rest_period_seconds)
                .bind(assignment.exercise_order)
                .bind(&assignment.notes)
                .execute(&mut *conn)
                .await
                .map_err(|e| TreeFailure::from_sqlx(&path, &e))?;
            }
        }

        guard.commit().await?;
        Ok(program_id)
    }

    /// Get a program tree visible to the caller (its trainer or its client)
    ///
    /// # Errors
    ///
    /// Returns not found when the program does not exist or is not visible
    pub async fn get_program(&self, caller: &CallerContext, program_id: &str) -> AppResult<ProgramTree> {
        let program_id = lookup_id(program_id);
        let program_id = program_id.as_str();
        let row = sqlx::query(
            r"
            SELECT id, name, description, trainer_id, client_id, created_at
            FROM training_programs
            WHERE id = $1 AND (trainer_id = $2 OR client_id = $2)
            ",
        )
        .bind(program_id)
        .bind(&caller.profile_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Program"))?;
        let program = program_from_row(&row)?;

        let assignment_rows = sqlx::query(
            r"
            SELECT a.id, a.day_id, a.exercise_id, e.name AS exercise_name, a.sets, a.reps,
                   a.rest_period_seconds, a.exercise_order, a.notes
            FROM exercise_assignments a
            JOIN training_days d ON d.id = a.day_id
            JOIN exercises e ON e.id = a.exercise_id
            WHERE d.program_id = $1
            ORDER BY a.exercise_order, a.rowid
            ",
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_day: HashMap<String, Vec<ProgramAssignment>> = HashMap::new();
        for row in &assignment_rows {
            let day_id: String = row.try_get("day_id")?;
            by_day.entry(day_id).or_default().push(ProgramAssignment {
                id: row.try_get("id")?,
                exercise_id: row.try_get("exercise_id")?,
                exercise_name: row.try_get("exercise_name")?,
                sets: row.try_get("sets")?,
                reps: row.try_get("reps")?,
                rest_period_seconds: row.try_get("rest_period_seconds")?,
                exercise_order: row.try_get("exercise_order")?,
                notes: row.try_get("notes")?,
            });
        }

        let day_rows = sqlx::query(
            r"
            SELECT id, name, day_order FROM training_days
            WHERE program_id = $1
            ORDER BY day_order, rowid
            ",
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;

        let days = day_rows
            .iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                Ok(ProgramDay {
                    exercises: by_day.remove(&id).unwrap_or_default(),
                    id,
                    name: row.try_get("name")?,
                    day_order: row.try_get("day_order")?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(ProgramTree { program, days })
    }

    /// Programs where the caller is the trainer or the client, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_programs(&self, caller: &CallerContext) -> AppResult<Vec<TrainingProgram>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, trainer_id, client_id, created_at
            FROM training_programs
            WHERE trainer_id = $1 OR client_id = $1
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .bind(&caller.profile_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(program_from_row).collect()
    }

    /// Delete a program and its days and assignments; trainer only
    ///
    /// # Errors
    ///
    /// Returns not found when the caller is not the program's trainer or the
    /// program does not exist
    pub async fn delete_program(&self, caller: &CallerContext, program_id: &str) -> AppResult<()> {
        let program_id = lookup_id(program_id);
        let program_id = program_id.as_str();
        let result = sqlx::query("DELETE FROM training_programs WHERE id = $1 AND trainer_id = $2")
            .bind(program_id)
            .bind(&caller.profile_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Program"));
        }
        info!(program_id = %program_id, "Deleted program");
        Ok(())
    }
}
