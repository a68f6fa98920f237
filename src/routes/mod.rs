// ABOUTME: Route module organization for the FitCoach HTTP API
// ABOUTME: Assembles domain routers with body limit, per-route timeouts and tracing layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP routes
//!
//! Each domain module exposes a `XRoutes::routes(resources)` router whose
//! handlers resolve the [`crate::context::CallerContext`] from the
//! `x-caller-id` header and delegate to a database manager. Tagged
//! operations (add client, composite creates, nutrition) always answer with
//! their tagged body; everything else uses the standard error body.

/// Activity records: workout logs and progress photos
pub mod activity;
/// Chat messages between linked profiles
pub mod chat;
/// Trainer client roster
pub mod clients;
/// Food plan composite create and reads
pub mod food_plans;
/// Liveness
pub mod health;
/// Identity provider hooks
pub mod hooks;
/// Exercise and food item libraries
pub mod library;
/// Nutrition estimation passthrough
pub mod nutrition;
/// Training program composite create and reads
pub mod programs;

pub use activity::ActivityRoutes;
pub use chat::ChatRoutes;
pub use clients::ClientRoutes;
pub use food_plans::FoodPlanRoutes;
pub use health::HealthRoutes;
pub use hooks::HookRoutes;
pub use library::LibraryRoutes;
pub use nutrition::NutritionRoutes;
pub use programs::ProgramRoutes;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::Router;
use serde::de::DeserializeOwned;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;

/// Build the full application router
///
/// The nutrition route carries its own timeout sized to the estimator's retry
/// budget; every other route shares the general request timeout.
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let max_body_bytes = resources.config.http.max_body_bytes;
    let request_timeout = resources.config.http.request_timeout;
    let nutrition_timeout = resources.config.nutrition_route_timeout();

    let api = Router::new()
        .merge(HookRoutes::routes(Arc::clone(&resources)))
        .merge(ClientRoutes::routes(Arc::clone(&resources)))
        .merge(ProgramRoutes::routes(Arc::clone(&resources)))
        .merge(FoodPlanRoutes::routes(Arc::clone(&resources)))
        .merge(LibraryRoutes::routes(Arc::clone(&resources)))
        .merge(ActivityRoutes::routes(Arc::clone(&resources)))
        .merge(ChatRoutes::routes(Arc::clone(&resources)))
        .layer(TimeoutLayer::new(request_timeout));
    let nutrition =
        NutritionRoutes::routes(resources).layer(TimeoutLayer::new(nutrition_timeout));

    Router::new()
        .merge(HealthRoutes::routes())
        .merge(api)
        .merge(nutrition)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Decode a JSON request body, reporting problems as invalid input
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_input(format!("Invalid request body: {e}")))
}

/// HTTP status for a numeric code produced by an outcome type
pub(crate) fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
