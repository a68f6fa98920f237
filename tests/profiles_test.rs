// ABOUTME: Integration tests for account provisioning and profile lifecycle
// ABOUTME: Covers role validation, unique emails and cascading account deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    count_rows, create_client, create_test_database, create_trainer, link_client, new_account,
    seed_exercise,
};
use fitcoach_server::database::{Database, NewExercise};
use fitcoach_server::errors::ErrorCode;
use fitcoach_server::models::Role;

#[tokio::test]
async fn test_provision_trainer_profile() {
    let database = create_test_database().await.unwrap();
    let account = new_account("Coach@Example.com", "  Casey Coach ", Some("Trainer"));

    let profile = database.profiles().provision_profile(&account).await.unwrap();
    assert_eq!(profile.id, account.id);
    assert_eq!(profile.full_name, "Casey Coach");
    assert_eq!(profile.role, Role::Trainer);

    let stored = database.profiles().get_profile(&account.id).await.unwrap().unwrap();
    assert_eq!(stored, profile);
}

#[tokio::test]
async fn test_provision_rejects_missing_role() {
    let database = create_test_database().await.unwrap();
    let account = new_account("norole@example.com", "No Role", None);

    let err = database.profiles().provision_profile(&account).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("metadata.role"));
    assert_eq!(count_rows(&database, "profiles").await, 0);
}

#[tokio::test]
async fn test_provision_rejects_unknown_role() {
    let database = create_test_database().await.unwrap();
    let account = new_account("admin@example.com", "Admin", Some("admin"));

    let err = database.profiles().provision_profile(&account).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(count_rows(&database, "profiles").await, 0);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected_case_insensitively() {
    let database = create_test_database().await.unwrap();
    create_client(&database, "sam@example.com").await.unwrap();

    let again = new_account("SAM@example.com", "Sam Again", Some("client"));
    let err = database.profiles().provision_profile(&again).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
    assert_eq!(count_rows(&database, "profiles").await, 1);
}

#[tokio::test]
async fn test_get_profile_by_email() {
    let database = create_test_database().await.unwrap();
    let (client, _) = create_client(&database, "lee@example.com").await.unwrap();

    let found = database
        .profiles()
        .get_profile_by_email(" LEE@example.com ")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, client.id);
    assert!(database
        .profiles()
        .get_profile_by_email("nobody@example.com")
        .await
        .unwrap()
        .is_none());
}

async fn seed_trainer_content(database: &Database) -> String {
    let (trainer, trainer_ctx) = create_trainer(database, "owner@example.com").await.unwrap();
    let (client, _) = create_client(database, "kept@example.com").await.unwrap();
    link_client(database, &trainer_ctx, &client).await;
    database
        .exercises()
        .create_exercise(
            &trainer_ctx,
            &NewExercise {
                name: "Private Press".into(),
                ..NewExercise::default()
            },
        )
        .await
        .unwrap();
    database
        .chat()
        .send_message(&trainer_ctx, &client.id, "Welcome aboard")
        .await
        .unwrap();
    trainer.id
}

#[tokio::test]
async fn test_deleting_profile_cascades() {
    let database = create_test_database().await.unwrap();
    seed_exercise(&database, "Squat").await.unwrap();
    let trainer_id = seed_trainer_content(&database).await;

    assert_eq!(count_rows(&database, "client_links").await, 1);
    assert_eq!(count_rows(&database, "exercises").await, 2);
    assert_eq!(count_rows(&database, "chat_messages").await, 1);

    assert!(database.profiles().delete_profile(&trainer_id).await.unwrap());

    assert_eq!(count_rows(&database, "profiles").await, 1);
    assert_eq!(count_rows(&database, "client_links").await, 0);
    assert_eq!(count_rows(&database, "exercises").await, 1);
    assert_eq!(count_rows(&database, "chat_messages").await, 0);

    assert!(!database.profiles().delete_profile(&trainer_id).await.unwrap());
}

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("nested/fitcoach.db").display());

    let profile_id = {
        let database = Database::new(&url, 2).await.unwrap();
        let (profile, _) = create_client(&database, "persist@example.com").await.unwrap();
        database.pool().close().await;
        profile.id
    };

    let reopened = Database::new(&url, 2).await.unwrap();
    let profile = reopened.profiles().get_profile(&profile_id).await.unwrap();
    assert_eq!(profile.map(|p| p.email).as_deref(), Some("persist@example.com"));
}
