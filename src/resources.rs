// ABOUTME: Shared server resources handed to every route as axum state
// ABOUTME: Bundles the database, the loaded configuration and the nutrition estimator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::AppResult;
use crate::external::{NutritionEstimator, VisionNutritionClient};

/// Everything a request handler needs, created once at startup
#[derive(Clone)]
pub struct ServerResources {
    /// Database handle
    pub database: Database,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Nutrition estimation backend
    pub nutrition: Arc<dyn NutritionEstimator>,
}

impl ServerResources {
    /// Bundle resources with an explicit estimator (tests pass a mock)
    #[must_use]
    pub fn new(
        database: Database,
        config: Arc<ServerConfig>,
        nutrition: Arc<dyn NutritionEstimator>,
    ) -> Self {
        Self {
            database,
            config,
            nutrition,
        }
    }

    /// Bundle resources using the vision client built from `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn with_vision_client(database: Database, config: Arc<ServerConfig>) -> AppResult<Self> {
        let nutrition = Arc::new(VisionNutritionClient::new(config.nutrition.clone())?);
        Ok(Self::new(database, config, nutrition))
    }
}
