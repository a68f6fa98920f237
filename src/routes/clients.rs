// ABOUTME: Trainer roster routes: add a client by email, list and remove clients
// ABOUTME: Adding a client always answers with the tagged outcome body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;

use super::{decode_body, status_code};
use crate::context::CallerContext;
use crate::errors::AppError;
use crate::models::AddClientResponse;
use crate::resources::ServerResources;

/// Body of POST /api/clients
#[derive(Debug, Deserialize)]
struct AddClientBody {
    #[serde(default)]
    client_email: String,
}

/// Client roster routes handler
pub struct ClientRoutes;

impl ClientRoutes {
    /// Create client roster routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/clients", get(Self::handle_list).post(Self::handle_add))
            .route("/api/clients/:client_id", delete(Self::handle_remove))
            .with_state(resources)
    }

    /// Handle POST /api/clients
    async fn handle_add(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let body: AddClientBody = decode_body(&body)?;
        let outcome = resources
            .database
            .clients()
            .add_client_by_email(&caller, &body.client_email)
            .await;

        let status = status_code(outcome.http_status());
        Ok((status, Json(AddClientResponse::from(outcome))).into_response())
    }

    /// Handle GET /api/clients
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
    ) -> Result<Response, AppError> {
        let clients = resources.database.clients().list_clients(&caller).await?;
        Ok((StatusCode::OK, Json(clients)).into_response())
    }

    /// Handle DELETE /api/clients/:client_id
    async fn handle_remove(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        Path(client_id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .database
            .clients()
            .remove_client(&caller, &client_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
