// ABOUTME: External API client modules (vision nutrition estimation)
// ABOUTME: Outbound calls live behind traits so routes and tests can swap implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! External API Clients

pub mod nutrition_client;

pub use nutrition_client::{
    MockNutritionEstimator, NutritionClientConfig, NutritionError, NutritionEstimator,
    VisionNutritionClient,
};
