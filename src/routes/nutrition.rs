// ABOUTME: Nutrition estimation route forwarding a food photo to the configured estimator
// ABOUTME: Answers with the four nutrition fields or an error body carrying a failure kind
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
use serde::{Deserialize, Serialize};

use crate::context::CallerContext;
use crate::external::NutritionError;
use crate::resources::ServerResources;

#[derive(Debug, Deserialize)]
struct EstimateBody {
    #[serde(default)]
    image: String,
}

/// Failure body of POST /api/nutrition/estimate
#[derive(Debug, Serialize, Deserialize)]
pub struct NutritionErrorResponse {
    /// Human-readable message; upstream text is passed through
    pub error: String,
    /// Failure kind
    pub kind: String,
}

impl IntoResponse for NutritionError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        };
        let body = NutritionErrorResponse {
            error: self.to_string(),
            kind: self.kind().to_owned(),
        };
        (status, Json(body)).into_response()
    }
}

/// Nutrition routes handler
pub struct NutritionRoutes;

impl NutritionRoutes {
    /// Create nutrition routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/nutrition/estimate", post(Self::handle_estimate))
            .with_state(resources)
    }

    /// Handle POST /api/nutrition/estimate
    async fn handle_estimate(
        State(resources): State<Arc<ServerResources>>,
        _caller: CallerContext,
        body: Bytes,
    ) -> Result<Response, NutritionError> {
        let body: EstimateBody = serde_json::from_slice(&body).map_err(|e| {
            NutritionError::InvalidImage(format!("request body must be {{\"image\": <base64>}}: {e}"))
        })?;
        let estimate = resources.nutrition.estimate(&body.image).await?;
        Ok((StatusCode::OK, Json(estimate)).into_response())
    }
}
