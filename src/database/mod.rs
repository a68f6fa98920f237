// ABOUTME: SQLite database bootstrap, schema migrations and entity manager accessors
// ABOUTME: Enforces foreign keys with cascading deletes, role checks and immutable chat rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! One [`Database`] owns the `SQLite` pool. Each entity family has a manager
//! holding a clone of the pool, following the same shape:
//! `XManager::new(pool)` plus async methods returning [`AppResult`] or a
//! tagged outcome.
//!
//! Every owner reference is declared `ON DELETE CASCADE`, so deleting a
//! profile removes everything it owns and deleting a program or food plan
//! removes its whole tree.

/// Trainer to client links and the add-client operation
pub mod clients;
/// Chat messages between linked trainers and clients
pub mod chat;
/// Shared pieces of the composite-create transactions
pub mod composite;
/// Exercise library
pub mod exercises;
/// Food item library
pub mod food_items;
/// Food plans and their composite create
pub mod food_plans;
/// Profiles and account provisioning
pub mod profiles;
/// Training programs and their composite create
pub mod programs;
/// Progress photos
pub mod progress_photos;
/// RAII transaction guard and retry with backoff
pub mod transactions;
/// Workout set logs
pub mod workout_logs;

pub use chat::{ChatManager, ChatMessage};
pub use clients::ClientLinksManager;
pub use exercises::{Exercise, ExercisesManager, NewExercise};
pub use food_items::{FoodItem, FoodItemsManager};
pub use food_plans::{
    FoodPlan, FoodPlanDay, FoodPlanMeal, FoodPlanMealItem, FoodPlanTree, FoodPlansManager,
};
pub use profiles::ProfilesManager;
pub use programs::{ProgramAssignment, ProgramDay, ProgramTree, ProgramsManager, TrainingProgram};
pub use progress_photos::{NewProgressPhoto, ProgressPhoto, ProgressPhotosManager};
pub use transactions::{retry_transaction, RetryableError, TransactionGuard};
pub use workout_logs::{NewWorkoutLog, WorkoutLog, WorkoutLogsManager};

use std::str::FromStr;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::constants::database::BUSY_TIMEOUT_SECS;
use crate::errors::{AppError, AppResult};

/// Current time as an RFC 3339 UTC string with microseconds.
///
/// Fixed precision keeps lexical and chronological order identical.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Database handle owning the connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    ///
    /// In-memory URLs get a single connection that never expires so every
    /// query sees the same database. File URLs get WAL journaling, a busy
    /// timeout and `max_connections` pooled connections; the parent
    /// directory is created when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails or a
    /// migration fails
    pub async fn new(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL {database_url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        AppError::config(format!(
                            "Cannot create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(
                    options
                        .journal_mode(SqliteJournalMode::Wal)
                        .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS)),
                )
                .await?
        };

        let database = Self { pool };
        database.migrate().await?;
        info!("Database ready");
        Ok(database)
    }

    /// Get a reference to the pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run schema migrations; safe to repeat
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.run_statements("profiles", PROFILE_SCHEMA).await?;
        self.run_statements("libraries", LIBRARY_SCHEMA).await?;
        self.run_statements("programs", PROGRAM_SCHEMA).await?;
        self.run_statements("food plans", FOOD_PLAN_SCHEMA).await?;
        self.run_statements("activity", ACTIVITY_SCHEMA).await?;
        Ok(())
    }

    async fn run_statements(&self, area: &str, statements: &[&str]) -> AppResult<()> {
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration of {area} failed: {e}")))?;
        }
        debug!(area, "Migrated schema");
        Ok(())
    }

    /// Profile manager
    #[must_use]
    pub fn profiles(&self) -> ProfilesManager {
        ProfilesManager::new(self.pool.clone())
    }

    /// Client link manager
    #[must_use]
    pub fn clients(&self) -> ClientLinksManager {
        ClientLinksManager::new(self.pool.clone())
    }

    /// Exercise library manager
    #[must_use]
    pub fn exercises(&self) -> ExercisesManager {
        ExercisesManager::new(self.pool.clone())
    }

    /// Food item library manager
    #[must_use]
    pub fn food_items(&self) -> FoodItemsManager {
        FoodItemsManager::new(self.pool.clone())
    }

    /// Training program manager
    #[must_use]
    pub fn programs(&self) -> ProgramsManager {
        ProgramsManager::new(self.pool.clone())
    }

    /// Food plan manager
    #[must_use]
    pub fn food_plans(&self) -> FoodPlansManager {
        FoodPlansManager::new(self.pool.clone())
    }

    /// Workout log manager
    #[must_use]
    pub fn workout_logs(&self) -> WorkoutLogsManager {
        WorkoutLogsManager::new(self.pool.clone())
    }

    /// Progress photo manager
    #[must_use]
    pub fn progress_photos(&self) -> ProgressPhotosManager {
        ProgressPhotosManager::new(self.pool.clone())
    }

    /// Chat manager
    #[must_use]
    pub fn chat(&self) -> ChatManager {
        ChatManager::new(self.pool.clone())
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

// ============================================================================
// Schema
// ============================================================================

const PROFILE_SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        role TEXT NOT NULL CHECK (role IN ('trainer', 'client')),
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS client_links (
        id TEXT PRIMARY KEY,
        trainer_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        client_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        UNIQUE (trainer_id, client_id)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_client_links_client ON client_links(client_id)",
];

const LIBRARY_SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS exercises (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        video_url TEXT,
        created_by TEXT REFERENCES profiles(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_exercises_created_by ON exercises(created_by)",
    r"
    CREATE TABLE IF NOT EXISTS food_items (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        created_by TEXT REFERENCES profiles(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )
    ",
];

const PROGRAM_SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS training_programs (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        trainer_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        client_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_training_programs_trainer ON training_programs(trainer_id)",
    "CREATE INDEX IF NOT EXISTS idx_training_programs_client ON training_programs(client_id)",
    r"
    CREATE TABLE IF NOT EXISTS training_days (
        id TEXT PRIMARY KEY,
        program_id TEXT NOT NULL REFERENCES training_programs(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        day_order INTEGER NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_training_days_program ON training_days(program_id)",
    r"
    CREATE TABLE IF NOT EXISTS exercise_assignments (
        id TEXT PRIMARY KEY,
        day_id TEXT NOT NULL REFERENCES training_days(id) ON DELETE CASCADE,
        exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
        sets INTEGER NOT NULL CHECK (sets >= 1),
        reps TEXT NOT NULL,
        rest_period_seconds INTEGER CHECK (rest_period_seconds IS NULL OR rest_period_seconds >= 0),
        exercise_order INTEGER NOT NULL,
        notes TEXT,
        UNIQUE (day_id, exercise_id, exercise_order)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_exercise_assignments_day ON exercise_assignments(day_id)",
];

const FOOD_PLAN_SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS food_plans (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        trainer_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        client_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_food_plans_trainer ON food_plans(trainer_id)",
    "CREATE INDEX IF NOT EXISTS idx_food_plans_client ON food_plans(client_id)",
    r"
    CREATE TABLE IF NOT EXISTS food_days (
        id TEXT PRIMARY KEY,
        food_plan_id TEXT NOT NULL REFERENCES food_plans(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        day_order INTEGER NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_food_days_plan ON food_days(food_plan_id)",
    r"
    CREATE TABLE IF NOT EXISTS meals (
        id TEXT PRIMARY KEY,
        food_day_id TEXT NOT NULL REFERENCES food_days(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        meal_order INTEGER NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_meals_day ON meals(food_day_id)",
    r"
    CREATE TABLE IF NOT EXISTS meal_items (
        id TEXT PRIMARY KEY,
        meal_id TEXT NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
        food_item_id TEXT NOT NULL REFERENCES food_items(id) ON DELETE CASCADE,
        quantity TEXT NOT NULL,
        item_order INTEGER NOT NULL,
        notes TEXT,
        UNIQUE (meal_id, food_item_id, item_order)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_meal_items_meal ON meal_items(meal_id)",
];

const ACTIVITY_SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS workout_logs (
        id TEXT PRIMARY KEY,
        exercise_assignment_id TEXT NOT NULL REFERENCES exercise_assignments(id) ON DELETE CASCADE,
        client_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        set_number INTEGER NOT NULL CHECK (set_number >= 1),
        reps_completed INTEGER NOT NULL CHECK (reps_completed >= 0),
        weight REAL CHECK (weight IS NULL OR weight >= 0),
        logged_at TEXT NOT NULL,
        UNIQUE (exercise_assignment_id, client_id, set_number, logged_at)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_workout_logs_assignment ON workout_logs(exercise_assignment_id)",
    r"
    CREATE TABLE IF NOT EXISTS progress_photos (
        id TEXT PRIMARY KEY,
        client_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        photo_url TEXT NOT NULL,
        date_taken TEXT NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_progress_photos_client ON progress_photos(client_id)",
    r"
    CREATE TABLE IF NOT EXISTS chat_messages (
        id TEXT PRIMARY KEY,
        sender_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        receiver_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_chat_messages_pair ON chat_messages(sender_id, receiver_id, created_at)",
    r"
    CREATE TRIGGER IF NOT EXISTS chat_messages_immutable
    BEFORE UPDATE ON chat_messages
    BEGIN
        SELECT RAISE(ABORT, 'chat messages are immutable');
    END
    ",
];
