// ABOUTME: Integration tests for all-or-nothing food plan creation
// ABOUTME: Four-level trees, rollback on missing food items, and plan reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{count_rows, create_client, create_test_database, create_trainer, seed_food_item};
use fitcoach_server::database::Database;
use fitcoach_server::errors::ErrorCode;
use fitcoach_server::models::{CreateTreeOutcome, FailureReason, FoodPlanDocument};
use serde_json::{json, Value};
use uuid::Uuid;

fn plan_document(client_id: &str, days: Value) -> FoodPlanDocument {
    serde_json::from_value(json!({
        "name": "Lean Bulk",
        "client_id": client_id,
        "days": days,
    }))
    .unwrap()
}

async fn plan_row_counts(database: &Database) -> [i64; 4] {
    [
        count_rows(database, "food_plans").await,
        count_rows(database, "food_days").await,
        count_rows(database, "meals").await,
        count_rows(database, "meal_items").await,
    ]
}

#[tokio::test]
async fn test_create_food_plan_writes_whole_tree() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, client_ctx) = create_client(&database, "member@example.com").await.unwrap();
    let oats = seed_food_item(&database, "Oats").await.unwrap();
    let eggs = seed_food_item(&database, "Eggs").await.unwrap();
    let rice = seed_food_item(&database, "Rice").await.unwrap();

    let document = plan_document(
        &client.id,
        json!([
            {"name": "Monday", "day_order": 1, "meals": [
                {"name": "Breakfast", "meal_order": 1, "items": [
                    {"food_item_id": oats.id, "quantity": "80 g", "item_order": 1},
                    {"food_item_id": eggs.id, "quantity": 3, "item_order": 2, "notes": "scrambled"}
                ]},
                {"name": "Lunch", "meal_order": 2, "items": [
                    {"food_item_id": rice.id, "quantity": "200 g", "item_order": 1}
                ]}
            ]},
            {"name": "Tuesday", "day_order": 2, "meals": [
                {"name": "Breakfast", "meal_order": 1, "items": [
                    {"food_item_id": oats.id, "quantity": "60 g", "item_order": 1}
                ]}
            ]}
        ]),
    );

    let outcome = database.food_plans().create_food_plan(&trainer, &document).await;
    let plan_id = outcome.created_id().unwrap().to_owned();
    assert_eq!(plan_row_counts(&database).await, [1, 2, 3, 4]);

    let tree = database
        .food_plans()
        .get_food_plan(&client_ctx, &plan_id)
        .await
        .unwrap();
    assert_eq!(tree.plan.name, "Lean Bulk");
    assert_eq!(tree.days.len(), 2);

    let monday = &tree.days[0];
    assert_eq!(monday.meals.len(), 2);
    let breakfast = &monday.meals[0];
    assert_eq!(breakfast.name, "Breakfast");
    assert_eq!(breakfast.items.len(), 2);
    assert_eq!(breakfast.items[0].food_item_name, "Oats");
    assert_eq!(breakfast.items[1].quantity, "3");
    assert_eq!(breakfast.items[1].notes.as_deref(), Some("scrambled"));
    assert_eq!(monday.meals[1].items[0].food_item_id, rice.id);
}

#[tokio::test]
async fn test_missing_food_item_rolls_back_everything() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, _) = create_client(&database, "member@example.com").await.unwrap();
    let oats = seed_food_item(&database, "Oats").await.unwrap();

    let document = plan_document(
        &client.id,
        json!([
            {"name": "Monday", "day_order": 1, "meals": [
                {"name": "Breakfast", "meal_order": 1, "items": [
                    {"food_item_id": oats.id, "quantity": "80 g", "item_order": 1}
                ]},
                {"name": "Dinner", "meal_order": 2, "items": [
                    {"food_item_id": oats.id, "quantity": "40 g", "item_order": 1},
                    {"food_item_id": Uuid::new_v4().to_string(), "quantity": "1", "item_order": 2}
                ]}
            ]}
        ]),
    );

    let outcome = database.food_plans().create_food_plan(&trainer, &document).await;
    match outcome {
        CreateTreeOutcome::Failed { reason, message } => {
            assert_eq!(reason, FailureReason::ReferenceNotFound);
            assert!(
                message.contains("days[0].meals[1].items[1].food_item_id"),
                "{message}"
            );
        }
        CreateTreeOutcome::Created { .. } => panic!("food plan should not be created"),
    }
    assert_eq!(plan_row_counts(&database).await, [0, 0, 0, 0]);
}

#[tokio::test]
async fn test_blank_quantity_is_validation_error() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, _) = create_client(&database, "member@example.com").await.unwrap();
    let oats = seed_food_item(&database, "Oats").await.unwrap();

    let document = plan_document(
        &client.id,
        json!([{"name": "Monday", "day_order": 1, "meals": [
            {"name": "Breakfast", "meal_order": 1, "items": [
                {"food_item_id": oats.id, "quantity": "  ", "item_order": 1}
            ]}
        ]}]),
    );

    let outcome = database.food_plans().create_food_plan(&trainer, &document).await;
    assert_eq!(outcome.reason(), Some(FailureReason::Validation));
    assert_eq!(outcome.http_status(), 400);
    assert_eq!(plan_row_counts(&database).await, [0, 0, 0, 0]);
}

#[tokio::test]
async fn test_list_visibility_and_delete() {
    let database = create_test_database().await.unwrap();
    let (_, trainer) = create_trainer(&database, "coach@example.com").await.unwrap();
    let (client, client_ctx) = create_client(&database, "member@example.com").await.unwrap();
    let (_, bystander) = create_client(&database, "bystander@example.com").await.unwrap();

    let first = database
        .food_plans()
        .create_food_plan(&trainer, &plan_document(&client.id, json!([])))
        .await;
    let second = database
        .food_plans()
        .create_food_plan(&trainer, &plan_document(&client.id, json!([])))
        .await;

    let listed = database.food_plans().list_food_plans(&client_ctx).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![second.created_id().unwrap(), first.created_id().unwrap()]
    );
    assert!(database
        .food_plans()
        .list_food_plans(&bystander)
        .await
        .unwrap()
        .is_empty());

    let err = database
        .food_plans()
        .get_food_plan(&bystander, first.created_id().unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    database
        .food_plans()
        .delete_food_plan(&trainer, first.created_id().unwrap())
        .await
        .unwrap();
    assert_eq!(count_rows(&database, "food_plans").await, 1);
}
