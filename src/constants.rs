// ABOUTME: Application-wide constants and configuration defaults
// ABOUTME: Service identity, environment defaults, request limits and retry tuning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Defaults used when an environment variable is not set, plus fixed limits
//! shared by the database layer and the HTTP routes.

/// Service identity
pub mod service_names {
    /// Service name reported by logging and the health endpoint
    pub const FITCOACH_SERVER: &str = "fitcoach-server";
}

/// Defaults for environment configuration
pub mod defaults {
    /// Bind host
    pub const HTTP_HOST: &str = "0.0.0.0";
    /// Bind port
    pub const HTTP_PORT: u16 = 8081;
    /// Database location
    pub const DATABASE_URL: &str = "sqlite:./data/fitcoach.db";
    /// Pool size for file databases
    pub const DATABASE_MAX_CONNECTIONS: u32 = 5;
    /// Request body limit, large enough for a base64 photo
    pub const HTTP_MAX_BODY_BYTES: usize = 12 * 1024 * 1024;
    /// Per-request timeout
    pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;
    /// OpenAI-compatible API base URL
    pub const NUTRITION_API_BASE_URL: &str = "https://api.openai.com/v1";
    /// Vision model used for nutrition estimates
    pub const NUTRITION_MODEL: &str = "gpt-4o-mini";
    /// Per-attempt timeout of the nutrition call
    pub const NUTRITION_TIMEOUT_SECS: u64 = 30;
    /// Retries after the first nutrition attempt
    pub const NUTRITION_MAX_RETRIES: u32 = 2;
    /// First backoff delay of the nutrition retry loop
    pub const NUTRITION_RETRY_BASE_DELAY_MS: u64 = 250;
    /// Headroom of the nutrition route timeout over the client's worst case
    pub const NUTRITION_ROUTE_GRACE_SECS: u64 = 5;
    /// Upper bound accepted for `NUTRITION_MAX_RETRIES`
    pub const NUTRITION_MAX_RETRIES_LIMIT: u32 = 10;
}

/// Timeouts for outbound HTTP clients
pub mod timeouts {
    /// TCP connect timeout for the nutrition API
    pub const NUTRITION_CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Database tuning
pub mod database {
    /// `SQLite` busy timeout for file databases
    pub const BUSY_TIMEOUT_SECS: u64 = 5;
    /// Retries of a composite transaction after a lock or busy error
    pub const MAX_TRANSACTION_RETRIES: u32 = 3;
    /// Default page size of a chat conversation
    pub const DEFAULT_CONVERSATION_LIMIT: u32 = 100;
    /// Largest page size of a chat conversation
    pub const MAX_CONVERSATION_LIMIT: u32 = 500;
}

/// HTTP headers
pub mod headers {
    /// Verified profile id forwarded by the identity gateway
    pub const CALLER_ID: &str = "x-caller-id";
}
