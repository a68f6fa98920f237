// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides the in-memory database, seeded profiles and library entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args
)]
//! Shared test utilities for `fitcoach_server`
//!
//! Common setup for the integration tests: a migrated in-memory database,
//! provisioned trainers and clients, and library seeds.

use std::collections::HashMap;
use std::sync::{Arc, Once};

use anyhow::Result;
use fitcoach_server::{
    config::ServerConfig,
    context::CallerContext,
    database::{Database, Exercise, FoodItem, NewExercise},
    external::NutritionEstimator,
    models::{AddClientOutcome, NewAccount, Profile},
    resources::ServerResources,
};
use serde_json::json;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:", 1).await?)
}

/// Registration event with the given role metadata
pub fn new_account(email: &str, full_name: &str, role: Option<&str>) -> NewAccount {
    let mut metadata = HashMap::new();
    metadata.insert("full_name".to_owned(), json!(full_name));
    if let Some(role) = role {
        metadata.insert("role".to_owned(), json!(role));
    }
    NewAccount {
        id: Uuid::new_v4().to_string(),
        email: email.to_owned(),
        metadata,
    }
}

async fn provision(database: &Database, email: &str, role: &str) -> Result<(Profile, CallerContext)> {
    let name = email.split('@').next().unwrap_or(email);
    let profile = database
        .profiles()
        .provision_profile(&new_account(email, name, Some(role)))
        .await?;
    let caller = CallerContext::new(&profile.id)?;
    Ok((profile, caller))
}

/// Provision a trainer profile and return it with its caller context
pub async fn create_trainer(database: &Database, email: &str) -> Result<(Profile, CallerContext)> {
    provision(database, email, "trainer").await
}

/// Provision a client profile and return it with its caller context
pub async fn create_client(database: &Database, email: &str) -> Result<(Profile, CallerContext)> {
    provision(database, email, "client").await
}

/// Put `client` on the trainer's roster
pub async fn link_client(database: &Database, trainer: &CallerContext, client: &Profile) {
    let outcome = database
        .clients()
        .add_client_by_email(trainer, &client.email)
        .await;
    assert!(
        matches!(outcome, AddClientOutcome::Success { .. }),
        "linking {} failed: {:?}",
        client.email,
        outcome
    );
}

/// Seed a global library exercise
pub async fn seed_exercise(database: &Database, name: &str) -> Result<Exercise> {
    Ok(database
        .exercises()
        .create_global_exercise(&NewExercise {
            name: name.to_owned(),
            ..NewExercise::default()
        })
        .await?)
}

/// Seed a global food item
pub async fn seed_food_item(database: &Database, name: &str) -> Result<FoodItem> {
    Ok(database.food_items().create_global_food_item(name).await?)
}

/// Count the rows of `table`
pub async fn count_rows(database: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(database.pool())
        .await
        .unwrap()
}

/// Server resources over `database` with the given estimator
pub fn create_test_resources(
    database: Database,
    nutrition: Arc<dyn NutritionEstimator>,
) -> Arc<ServerResources> {
    Arc::new(ServerResources::new(
        database,
        Arc::new(ServerConfig::default()),
        nutrition,
    ))
}
