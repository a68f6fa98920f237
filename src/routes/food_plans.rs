// ABOUTME: Food plan routes: composite create, list, tree read and delete
// ABOUTME: Mirrors the program routes one level deeper
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

use super::status_code;
use crate::context::CallerContext;
use crate::errors::AppError;
use crate::models::{CreateTreeOutcome, FailureReason, FoodPlanCreateResponse, FoodPlanDocument};
use crate::resources::ServerResources;

/// Food plan routes handler
pub struct FoodPlanRoutes;

impl FoodPlanRoutes {
    /// Create food plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/food-plans",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/food-plans/:id",
                get(Self::handle_get).delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle POST /api/food-plans
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        body: Bytes,
    ) -> Response {
        let outcome = match serde_json::from_slice::<FoodPlanDocument>(&body) {
            Ok(document) => {
                resources
                    .database
                    .food_plans()
                    .create_food_plan(&caller, &document)
                    .await
            }
            Err(e) => CreateTreeOutcome::failed(
                FailureReason::Validation,
                format!("Invalid food plan document: {e}"),
            ),
        };

        let status = status_code(outcome.http_status());
        (status, Json(FoodPlanCreateResponse::from(outcome))).into_response()
    }

    /// Handle GET /api/food-plans
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
    ) -> Result<Response, AppError> {
        let plans = resources
            .database
            .food_plans()
            .list_food_plans(&caller)
            .await?;
        Ok((StatusCode::OK, Json(plans)).into_response())
    }

    /// Handle GET /api/food-plans/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        Path(food_plan_id): Path<String>,
    ) -> Result<Response, AppError> {
        let plan = resources
            .database
            .food_plans()
            .get_food_plan(&caller, &food_plan_id)
            .await?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Handle DELETE /api/food-plans/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        Path(food_plan_id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .database
            .food_plans()
            .delete_food_plan(&caller, &food_plan_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
