// ABOUTME: Core crate for the FitCoach platform with shared errors and domain models
// ABOUTME: Used by the server crate for request documents, outcomes, and error responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FitCoach` Core
//!
//! Foundation types shared by the server crate:
//!
//! - **errors**: `AppError`, `ErrorCode` and the standard error response body
//! - **models**: profiles, program and food-plan documents, tagged outcomes,
//!   nutrition estimates

/// Unified error handling with standard error codes and HTTP mapping
pub mod errors;

/// Domain models, request documents and operation outcomes
pub mod models;
