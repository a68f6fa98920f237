// ABOUTME: Exercise and food item library routes
// ABOUTME: Lists return global entries plus the caller's own; creation is trainer only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::decode_body;
use crate::context::CallerContext;
use crate::database::NewExercise;
use crate::errors::AppError;
use crate::resources::ServerResources;

#[derive(Debug, Deserialize)]
struct NewFoodItemBody {
    #[serde(default)]
    name: String,
}

/// Library routes handler
pub struct LibraryRoutes;

impl LibraryRoutes {
    /// Create library routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/exercises",
                get(Self::handle_list_exercises).post(Self::handle_create_exercise),
            )
            .route("/api/exercises/:exercise_id", get(Self::handle_get_exercise))
            .route(
                "/api/food-items",
                get(Self::handle_list_food_items).post(Self::handle_create_food_item),
            )
            .with_state(resources)
    }

    async fn handle_list_exercises(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
    ) -> Result<Response, AppError> {
        let exercises = resources.database.exercises().list_exercises(&caller).await?;
        Ok((StatusCode::OK, Json(exercises)).into_response())
    }

    /// Handle GET /api/exercises/:exercise_id; other trainers' exercises read as missing
    async fn handle_get_exercise(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        Path(exercise_id): Path<String>,
    ) -> Result<Response, AppError> {
        let exercise = resources
            .database
            .exercises()
            .get_exercise(&exercise_id)
            .await?
            .filter(|exercise| {
                exercise.created_by.is_none()
                    || exercise.created_by.as_deref() == Some(caller.profile_id.as_str())
            })
            .ok_or_else(|| AppError::not_found("Exercise"))?;
        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    async fn handle_create_exercise(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let exercise: NewExercise = decode_body(&body)?;
        let created = resources
            .database
            .exercises()
            .create_exercise(&caller, &exercise)
            .await?;
        Ok((StatusCode::CREATED, Json(created)).into_response())
    }

    async fn handle_list_food_items(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
    ) -> Result<Response, AppError> {
        let items = resources.database.food_items().list_food_items(&caller).await?;
        Ok((StatusCode::OK, Json(items)).into_response())
    }

    async fn handle_create_food_item(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let body: NewFoodItemBody = decode_body(&body)?;
        let created = resources
            .database
            .food_items()
            .create_food_item(&caller, &body.name)
            .await?;
        Ok((StatusCode::CREATED, Json(created)).into_response())
    }
}
