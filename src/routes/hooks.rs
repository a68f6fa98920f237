// ABOUTME: Identity provider hook routes
// ABOUTME: Creates the profile for a newly registered account
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use super::decode_body;
use crate::errors::AppError;
use crate::models::NewAccount;
use crate::resources::ServerResources;

/// Hook routes handler
pub struct HookRoutes;

impl HookRoutes {
    /// Create hook routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/hooks/account-created",
                post(Self::handle_account_created),
            )
            .with_state(resources)
    }

    /// Handle POST /api/hooks/account-created
    ///
    /// Any failure is an error status so the identity provider aborts the
    /// registration.
    async fn handle_account_created(
        State(resources): State<Arc<ServerResources>>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let account: NewAccount = decode_body(&body)?;
        let profile = resources
            .database
            .profiles()
            .provision_profile(&account)
            .await?;

        Ok((StatusCode::CREATED, Json(profile)).into_response())
    }
}
