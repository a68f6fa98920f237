// ABOUTME: Training program routes: composite create, list, tree read and delete
// ABOUTME: Creation answers with the tagged result and a status derived from its reason
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
use crate::models::{CreateTreeOutcome, FailureReason, ProgramCreateResponse, ProgramDocument};
use crate::resources::ServerResources;

/// Training program routes handler
pub struct ProgramRoutes;

impl ProgramRoutes {
    /// Create program routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/programs",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/programs/:id",
                get(Self::handle_get).delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle POST /api/programs
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        body: Bytes,
    ) -> Response {
        let outcome = match serde_json::from_slice::<ProgramDocument>(&body) {
            Ok(document) => {
                resources
                    .database
                    .programs()
                    .create_program(&caller, &document)
                    .await
            }
            Err(e) => CreateTreeOutcome::failed(
                FailureReason::Validation,
                format!("Invalid program document: {e}"),
            ),
        };

        let status = status_code(outcome.http_status());
        (status, Json(ProgramCreateResponse::from(outcome))).into_response()
    }

    /// Handle GET /api/programs
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
    ) -> Result<Response, AppError> {
        let programs = resources.database.programs().list_programs(&caller).await?;
        Ok((StatusCode::OK, Json(programs)).into_response())
    }

    /// Handle GET /api/programs/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        Path(program_id): Path<String>,
    ) -> Result<Response, AppError> {
        let program = resources
            .database
            .programs()
            .get_program(&caller, &program_id)
            .await?;
        Ok((StatusCode::OK, Json(program)).into_response())
    }

    /// Handle DELETE /api/programs/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        Path(program_id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .database
            .programs()
            .delete_program(&caller, &program_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
