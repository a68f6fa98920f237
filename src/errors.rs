// ABOUTME: Re-exports the unified error types from fitcoach-core
// ABOUTME: Keeps crate::errors paths stable for every module of the server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Error types shared with `fitcoach-core`.
//!
//! See [`fitcoach_core::errors`] for the code table and HTTP mapping.

pub use fitcoach_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
