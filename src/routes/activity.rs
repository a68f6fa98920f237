// ABOUTME: Activity record routes for workout set logs and progress photos
// ABOUTME: Records are append-only; reads are scoped to the client and their trainers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::decode_body;
use crate::context::CallerContext;
use crate::database::{NewProgressPhoto, NewWorkoutLog};
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Activity routes handler
pub struct ActivityRoutes;

impl ActivityRoutes {
    /// Create activity routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/workout-logs", post(Self::handle_log_set))
            .route("/api/workout-logs/:assignment_id", get(Self::handle_list_logs))
            .route("/api/progress-photos", post(Self::handle_add_photo))
            .route("/api/progress-photos/:client_id", get(Self::handle_list_photos))
            .with_state(resources)
    }

    async fn handle_log_set(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let entry: NewWorkoutLog = decode_body(&body)?;
        let log = resources
            .database
            .workout_logs()
            .log_set(&caller, &entry)
            .await?;
        Ok((StatusCode::CREATED, Json(log)).into_response())
    }

    async fn handle_list_logs(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        Path(assignment_id): Path<String>,
    ) -> Result<Response, AppError> {
        let logs = resources
            .database
            .workout_logs()
            .list_logs(&caller, &assignment_id)
            .await?;
        Ok((StatusCode::OK, Json(logs)).into_response())
    }

    async fn handle_add_photo(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let photo: NewProgressPhoto = decode_body(&body)?;
        let stored = resources
            .database
            .progress_photos()
            .add_photo(&caller, &photo)
            .await?;
        Ok((StatusCode::CREATED, Json(stored)).into_response())
    }

    async fn handle_list_photos(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        Path(client_id): Path<String>,
    ) -> Result<Response, AppError> {
        let photos = resources
            .database
            .progress_photos()
            .list_photos(&caller, &client_id)
            .await?;
        Ok((StatusCode::OK, Json(photos)).into_response())
    }
}
