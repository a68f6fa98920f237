// ABOUTME: Integration tests for the trainer-adds-client operation and roster queries
// ABOUTME: Every branch of the tagged outcome plus concurrent duplicate adds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{count_rows, create_client, create_test_database, create_trainer};
use fitcoach_server::errors::ErrorCode;
use fitcoach_server::models::AddClientOutcome;

#[tokio::test]
async fn test_add_client_then_duplicate() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, _) = create_client(&database, "member@example.com").await.unwrap();

    let first = database
        .clients()
        .add_client_by_email(&trainer, "member@example.com")
        .await;
    assert_eq!(
        first,
        AddClientOutcome::Success {
            client_id: client.id.clone()
        }
    );

    let second = database
        .clients()
        .add_client_by_email(&trainer, "  MEMBER@example.com ")
        .await;
    assert_eq!(second, AddClientOutcome::AlreadyExists);
    assert_eq!(count_rows(&database, "client_links").await, 1);
    assert!(database
        .clients()
        .is_linked(&trainer.profile_id, &client.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_concurrent_adds_link_once() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    create_client(&database, "member@example.com").await.unwrap();

    let clients = database.clients();
    let (a, b, c) = tokio::join!(
        clients.add_client_by_email(&trainer, "member@example.com"),
        clients.add_client_by_email(&trainer, "member@example.com"),
        clients.add_client_by_email(&trainer, "member@example.com"),
    );

    let outcomes = [a, b, c];
    let successes = outcomes
        .iter()
        .filter(|o| matches!(o, AddClientOutcome::Success { .. }))
        .count();
    assert_eq!(successes, 1);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, AddClientOutcome::Success { .. } | AddClientOutcome::AlreadyExists)));
    assert_eq!(count_rows(&database, "client_links").await, 1);
}

#[tokio::test]
async fn test_unknown_email_is_not_found() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();

    let outcome = database
        .clients()
        .add_client_by_email(&trainer, "ghost@example.com")
        .await;
    assert_eq!(outcome, AddClientOutcome::NotFound);
    assert_eq!(outcome.http_status(), 404);

    let blank = database.clients().add_client_by_email(&trainer, "   ").await;
    assert_eq!(blank, AddClientOutcome::NotFound);
}

#[tokio::test]
async fn test_adding_a_trainer_is_wrong_role() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    create_trainer(&database, "other.coach@example.com").await.unwrap();

    let outcome = database
        .clients()
        .add_client_by_email(&trainer, "other.coach@example.com")
        .await;
    assert_eq!(outcome, AddClientOutcome::WrongRole);
    assert_eq!(count_rows(&database, "client_links").await, 0);
}

#[tokio::test]
async fn test_client_caller_is_access_denied() {
    let database = create_test_database().await.unwrap();
    let (_, client) = create_client(&database, "member@example.com").await.unwrap();
    create_client(&database, "friend@example.com").await.unwrap();

    let outcome = database
        .clients()
        .add_client_by_email(&client, "friend@example.com")
        .await;
    assert_eq!(outcome, AddClientOutcome::AccessDenied);
    assert_eq!(count_rows(&database, "client_links").await, 0);
}

#[tokio::test]
async fn test_list_and_remove_clients() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (first, client_ctx) = create_client(&database, "first@example.com").await.unwrap();
    let (second, _) = create_client(&database, "second@example.com").await.unwrap();

    for email in ["first@example.com", "second@example.com"] {
        database.clients().add_client_by_email(&trainer, email).await;
    }

    let roster = database.clients().list_clients(&trainer).await.unwrap();
    let ids: Vec<_> = roster.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

    let err = database.clients().list_clients(&client_ctx).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    database.clients().remove_client(&trainer, &first.id).await.unwrap();
    let roster = database.clients().list_clients(&trainer).await.unwrap();
    assert_eq!(roster.len(), 1);

    let err = database
        .clients()
        .remove_client(&trainer, &first.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
