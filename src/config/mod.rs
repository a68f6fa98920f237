// ABOUTME: Configuration management module for server settings
// ABOUTME: Loads HTTP, database and nutrition API settings from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the `FitCoach` server

/// Environment and server configuration
pub mod environment;

pub use environment::{DatabaseConfig, Environment, HttpConfig, ServerConfig};
