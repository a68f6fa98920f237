// ABOUTME: Chat routes for messages between a trainer and their client
// ABOUTME: Sending appends a message; reading returns the latest messages oldest first
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::decode_body;
use crate::context::CallerContext;
use crate::errors::AppError;
use crate::resources::ServerResources;

#[derive(Debug, Deserialize)]
struct SendMessageBody {
    receiver_id: String,
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct ConversationQuery {
    limit: Option<u32>,
}

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/messages", post(Self::handle_send))
            .route("/api/messages/:peer_id", get(Self::handle_conversation))
            .with_state(resources)
    }

    /// Handle POST /api/messages
    async fn handle_send(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let body: SendMessageBody = decode_body(&body)?;
        let message = resources
            .database
            .chat()
            .send_message(&caller, &body.receiver_id, &body.content)
            .await?;
        Ok((StatusCode::CREATED, Json(message)).into_response())
    }

    /// Handle GET /api/messages/:peer_id
    async fn handle_conversation(
        State(resources): State<Arc<ServerResources>>,
        caller: CallerContext,
        Path(peer_id): Path<String>,
        Query(query): Query<ConversationQuery>,
    ) -> Result<Response, AppError> {
        let messages = resources
            .database
            .chat()
            .conversation(&caller, &peer_id, query.limit)
            .await?;
        Ok((StatusCode::OK, Json(messages)).into_response())
    }
}
