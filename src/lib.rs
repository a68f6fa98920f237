// ABOUTME: Main library entry point for the FitCoach trainer and client coaching backend
// ABOUTME: Wires the relational store, composite transactions, nutrition passthrough and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # FitCoach Server
//!
//! Backend for a trainer and client coaching app. Trainers keep a roster of
//! clients, build training programs and food plans for them, and exchange
//! chat messages; clients log workouts and progress photos. A nutrition
//! passthrough estimates macro-nutrients from a food photo by calling an
//! external vision model.
//!
//! ## Architecture
//!
//! - **database**: `SQLite` schema, migrations and one manager per entity
//!   family, including the all-or-nothing composite creates
//! - **external**: the outbound nutrition estimation client
//! - **routes**: axum handlers that resolve the caller and call a manager
//! - **config** / **logging**: environment driven configuration and tracing setup
//!
//! Identity is established upstream; every operation receives an explicit
//! [`context::CallerContext`].

/// Environment configuration
pub mod config;

/// Application constants and defaults
pub mod constants;

/// Explicit caller identity passed to every operation
pub mod context;

/// Relational store, migrations and entity managers
pub mod database;

/// Error types re-exported from the core crate
pub mod errors;

/// Outbound API clients
pub mod external;

/// Structured logging setup
pub mod logging;

/// Domain models re-exported from the core crate
pub mod models;

/// Shared server state
pub mod resources;

/// HTTP routes
pub mod routes;
