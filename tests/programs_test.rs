// ABOUTME: Integration tests for all-or-nothing training program creation
// ABOUTME: Full trees, rollback on missing references, validation paths, visibility and cascades
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{count_rows, create_client, create_test_database, create_trainer, seed_exercise};
use fitcoach_server::database::{Database, NewExercise};
use fitcoach_server::errors::ErrorCode;
use fitcoach_server::models::{CreateTreeOutcome, FailureReason, ProgramDocument};
use serde_json::{json, Value};
use uuid::Uuid;

fn program_document(client_id: &str, days: Value) -> ProgramDocument {
    serde_json::from_value(json!({
        "name": "Push Pull Legs",
        "description": "Three day split",
        "client_id": client_id,
        "days": days,
    }))
    .unwrap()
}

async fn tree_row_counts(database: &Database) -> (i64, i64, i64) {
    (
        count_rows(database, "training_programs").await,
        count_rows(database, "training_days").await,
        count_rows(database, "exercise_assignments").await,
    )
}

#[tokio::test]
async fn test_create_program_writes_whole_tree() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, client_ctx) = create_client(&database, "member@example.com").await.unwrap();
    let bench = seed_exercise(&database, "Bench Press").await.unwrap();
    let row = seed_exercise(&database, "Barbell Row").await.unwrap();

    let document = program_document(
        &client.id,
        json!([
            {"name": "Push", "day_order": 1, "exercises": [
                {"exercise_id": bench.id, "sets": 3, "reps": "8-12", "exercise_order": 1,
                 "rest_period_seconds": "90", "notes": "  pause at the bottom "}
            ]},
            {"name": "Pull", "day_order": "2", "exercises": [
                {"exercise_id": row.id, "sets": "4", "reps": 5, "exercise_order": 1}
            ]}
        ]),
    );

    let outcome = database.programs().create_program(&trainer, &document).await;
    let program_id = outcome.created_id().unwrap().to_owned();
    assert_eq!(outcome.http_status(), 201);
    assert_eq!(tree_row_counts(&database).await, (1, 2, 2));

    let tree = database
        .programs()
        .get_program(&client_ctx, &program_id)
        .await
        .unwrap();
    assert_eq!(tree.program.trainer_id, trainer.profile_id);
    assert_eq!(tree.program.client_id, client.id);
    assert_eq!(tree.days.len(), 2);

    let push = &tree.days[0];
    assert_eq!(push.name, "Push");
    assert_eq!(push.exercises.len(), 1);
    assert_eq!(push.exercises[0].exercise_name, "Bench Press");
    assert_eq!(push.exercises[0].sets, 3);
    assert_eq!(push.exercises[0].reps, "8-12");
    assert_eq!(push.exercises[0].rest_period_seconds, Some(90));
    assert_eq!(push.exercises[0].notes.as_deref(), Some("pause at the bottom"));

    let pull = &tree.days[1];
    assert_eq!(pull.day_order, 2);
    assert_eq!(pull.exercises[0].sets, 4);
    assert_eq!(pull.exercises[0].reps, "5");
    assert_eq!(pull.exercises[0].exercise_order, 1);
    assert_eq!(pull.exercises[0].rest_period_seconds, None);
}

#[tokio::test]
async fn test_missing_exercise_rolls_back_everything() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, _) = create_client(&database, "member@example.com").await.unwrap();
    let bench = seed_exercise(&database, "Bench Press").await.unwrap();
    let missing = Uuid::new_v4().to_string();

    let document = program_document(
        &client.id,
        json!([
            {"name": "Push", "day_order": 1, "exercises": [
                {"exercise_id": bench.id, "sets": 3, "reps": "8-12", "exercise_order": 1}
            ]},
            {"name": "Pull", "day_order": 2, "exercises": [
                {"exercise_id": missing, "sets": 3, "reps": "10", "exercise_order": 1}
            ]}
        ]),
    );

    let outcome = database.programs().create_program(&trainer, &document).await;
    match &outcome {
        CreateTreeOutcome::Failed { reason, message } => {
            assert_eq!(*reason, FailureReason::ReferenceNotFound);
            assert!(message.contains("days[1].exercises[0].exercise_id"), "{message}");
        }
        CreateTreeOutcome::Created { .. } => panic!("program should not be created"),
    }
    assert_eq!(outcome.http_status(), 404);
    assert_eq!(tree_row_counts(&database).await, (0, 0, 0));
}

#[tokio::test]
async fn test_other_trainers_private_exercise_is_not_visible() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (_, rival) = create_trainer(&database, "rival@example.com").await.unwrap();
    let (client, _) = create_client(&database, "member@example.com").await.unwrap();
    let private = database
        .exercises()
        .create_exercise(
            &rival,
            &NewExercise {
                name: "Secret Lift".into(),
                ..NewExercise::default()
            },
        )
        .await
        .unwrap();

    let document = program_document(
        &client.id,
        json!([{"name": "Day", "day_order": 1, "exercises": [
            {"exercise_id": private.id, "sets": 1, "reps": "1", "exercise_order": 1}
        ]}]),
    );

    let outcome = database.programs().create_program(&trainer, &document).await;
    assert_eq!(outcome.reason(), Some(FailureReason::ReferenceNotFound));

    let own = database.programs().create_program(&rival, &document).await;
    assert!(own.created_id().is_some());
}

#[tokio::test]
async fn test_validation_failure_reports_path_and_writes_nothing() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, _) = create_client(&database, "member@example.com").await.unwrap();
    let bench = seed_exercise(&database, "Bench Press").await.unwrap();

    let document = program_document(
        &client.id,
        json!([
            {"name": "Push", "day_order": 1, "exercises": [
                {"exercise_id": bench.id, "sets": 3, "reps": "8", "exercise_order": 1},
                {"exercise_id": bench.id, "sets": "three", "reps": "8", "exercise_order": 2}
            ]}
        ]),
    );

    let outcome = database.programs().create_program(&trainer, &document).await;
    match outcome {
        CreateTreeOutcome::Failed { reason, message } => {
            assert_eq!(reason, FailureReason::Validation);
            assert!(message.starts_with("days[0].exercises[1].sets"), "{message}");
        }
        CreateTreeOutcome::Created { .. } => panic!("invalid document was accepted"),
    }
    assert_eq!(tree_row_counts(&database).await, (0, 0, 0));
}

#[tokio::test]
async fn test_out_of_range_number_is_rejected_not_clamped() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, _) = create_client(&database, "member@example.com").await.unwrap();
    let bench = seed_exercise(&database, "Bench Press").await.unwrap();

    let document = program_document(
        &client.id,
        json!([{"name": "Push", "day_order": 1, "exercises": [
            {"exercise_id": bench.id, "sets": 1e30, "reps": "8", "exercise_order": 1}
        ]}]),
    );

    let outcome = database.programs().create_program(&trainer, &document).await;
    match outcome {
        CreateTreeOutcome::Failed { reason, message } => {
            assert_eq!(reason, FailureReason::Validation);
            assert!(message.starts_with("days[0].exercises[0].sets"), "{message}");
        }
        CreateTreeOutcome::Created { .. } => panic!("out-of-range sets were accepted"),
    }
    assert_eq!(tree_row_counts(&database).await, (0, 0, 0));
}

#[tokio::test]
async fn test_duplicate_assignment_is_constraint_violation() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, _) = create_client(&database, "member@example.com").await.unwrap();
    let bench = seed_exercise(&database, "Bench Press").await.unwrap();

    let document = program_document(
        &client.id,
        json!([{"name": "Push", "day_order": 1, "exercises": [
            {"exercise_id": bench.id, "sets": 3, "reps": "8", "exercise_order": 1},
            {"exercise_id": bench.id, "sets": 3, "reps": "8", "exercise_order": 1}
        ]}]),
    );

    let outcome = database.programs().create_program(&trainer, &document).await;
    assert_eq!(outcome.reason(), Some(FailureReason::ConstraintViolation));
    assert_eq!(tree_row_counts(&database).await, (0, 0, 0));
}

#[tokio::test]
async fn test_authorization_outcomes() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (other_trainer, _) = create_trainer(&database, "other@example.com").await.unwrap();
    let (client, client_ctx) = create_client(&database, "member@example.com").await.unwrap();

    let as_client = database
        .programs()
        .create_program(&client_ctx, &program_document(&client.id, json!([])))
        .await;
    assert_eq!(as_client.reason(), Some(FailureReason::AccessDenied));

    let unknown = database
        .programs()
        .create_program(&trainer, &program_document(&Uuid::new_v4().to_string(), json!([])))
        .await;
    assert_eq!(unknown.reason(), Some(FailureReason::ClientNotFound));

    let not_client = database
        .programs()
        .create_program(&trainer, &program_document(&other_trainer.id, json!([])))
        .await;
    assert_eq!(not_client.reason(), Some(FailureReason::InvalidClient));
    assert_eq!(not_client.http_status(), 422);

    assert_eq!(tree_row_counts(&database).await, (0, 0, 0));
}

#[tokio::test]
async fn test_visibility_and_cascading_delete() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (_, stranger) = create_trainer(&database, "stranger@example.com").await.unwrap();
    let (client, client_ctx) = create_client(&database, "member@example.com").await.unwrap();
    let squat = seed_exercise(&database, "Squat").await.unwrap();

    let document = program_document(
        &client.id,
        json!([{"name": "Legs", "day_order": 1, "exercises": [
            {"exercise_id": squat.id, "sets": 5, "reps": "5", "exercise_order": 1}
        ]}]),
    );
    let outcome = database.programs().create_program(&trainer, &document).await;
    let program_id = outcome.created_id().unwrap().to_owned();

    let err = database
        .programs()
        .get_program(&stranger, &program_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert!(database.programs().list_programs(&stranger).await.unwrap().is_empty());
    assert_eq!(database.programs().list_programs(&client_ctx).await.unwrap().len(), 1);

    let err = database
        .programs()
        .delete_program(&client_ctx, &program_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    database.programs().delete_program(&trainer, &program_id).await.unwrap();
    assert_eq!(tree_row_counts(&database).await, (0, 0, 0));
}

#[tokio::test]
async fn test_days_are_read_in_day_order() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, _) = create_client(&database, "member@example.com").await.unwrap();

    let document = program_document(
        &client.id,
        json!([
            {"name": "Third", "day_order": 3},
            {"name": "First", "day_order": 1},
            {"name": "Second", "day_order": 2}
        ]),
    );
    let outcome = database.programs().create_program(&trainer, &document).await;
    let tree = database
        .programs()
        .get_program(&trainer, outcome.created_id().unwrap())
        .await
        .unwrap();
    let names: Vec<_> = tree.days.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}
