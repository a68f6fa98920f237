// ABOUTME: Environment-based configuration management for production deployment
// ABOUTME: Parses environment variables into typed server, database and nutrition settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use crate::constants::defaults;
use crate::external::NutritionClientConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Request body limit in bytes
    pub max_body_bytes: usize,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: defaults::HTTP_HOST.to_owned(),
            port: defaults::HTTP_PORT,
            max_body_bytes: defaults::HTTP_MAX_BODY_BYTES,
            request_timeout: Duration::from_secs(defaults::HTTP_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `SQLite` URL, `sqlite::memory:` allowed
    pub url: String,
    /// Pool size for file databases
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: defaults::DATABASE_URL.to_owned(),
            max_connections: defaults::DATABASE_MAX_CONNECTIONS,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// HTTP listener
    pub http: HttpConfig,
    /// Relational store
    pub database: DatabaseConfig,
    /// Outbound nutrition API
    pub nutrition: NutritionClientConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is malformed or the loaded
    /// configuration fails [`ServerConfig::validate`]
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            http: HttpConfig {
                host: env_var_or("HTTP_HOST", defaults::HTTP_HOST),
                port: parse_env("HTTP_PORT", defaults::HTTP_PORT)?,
                max_body_bytes: parse_env("HTTP_MAX_BODY_BYTES", defaults::HTTP_MAX_BODY_BYTES)?,
                request_timeout: Duration::from_secs(parse_env(
                    "HTTP_REQUEST_TIMEOUT_SECS",
                    defaults::HTTP_REQUEST_TIMEOUT_SECS,
                )?),
            },
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", defaults::DATABASE_URL),
                max_connections: parse_env(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults::DATABASE_MAX_CONNECTIONS,
                )?,
            },
            nutrition: NutritionClientConfig {
                base_url: env_var_or("NUTRITION_API_BASE_URL", defaults::NUTRITION_API_BASE_URL),
                api_key: env::var("NUTRITION_API_KEY")
                    .ok()
                    .map(|key| key.trim().to_owned())
                    .filter(|key| !key.is_empty()),
                model: env_var_or("NUTRITION_MODEL", defaults::NUTRITION_MODEL),
                timeout: Duration::from_secs(parse_env(
                    "NUTRITION_TIMEOUT_SECS",
                    defaults::NUTRITION_TIMEOUT_SECS,
                )?),
                max_retries: parse_env("NUTRITION_MAX_RETRIES", defaults::NUTRITION_MAX_RETRIES)?,
                retry_base_delay: Duration::from_millis(defaults::NUTRITION_RETRY_BASE_DELAY_MS),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Timeout applied to the nutrition route
    ///
    /// Covers every attempt and backoff of the nutrition client, so a hung
    /// upstream surfaces as the client's timeout failure rather than a bare
    /// HTTP timeout. Never shorter than the general request timeout.
    #[must_use]
    pub fn nutrition_route_timeout(&self) -> Duration {
        self.nutrition
            .worst_case_duration()
            .saturating_add(Duration::from_secs(defaults::NUTRITION_ROUTE_GRACE_SECS))
            .max(self.http.request_timeout)
    }

    /// Check cross-field rules
    ///
    /// # Errors
    ///
    /// Returns an error when production runs without a nutrition API key, a
    /// limit or timeout is zero, or the nutrition retry budget cannot fit in
    /// the nutrition route timeout
    pub fn validate(&self) -> Result<()> {
        if self.environment.is_production() && self.nutrition.api_key.is_none() {
            bail!("NUTRITION_API_KEY is required in production");
        }
        if self.database.max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }
        if self.http.max_body_bytes == 0 {
            bail!("HTTP_MAX_BODY_BYTES must be at least 1");
        }
        if self.nutrition.timeout.is_zero() {
            bail!("NUTRITION_TIMEOUT_SECS must be at least 1");
        }
        if self.http.request_timeout.is_zero() {
            bail!("HTTP_REQUEST_TIMEOUT_SECS must be at least 1");
        }
        if self.nutrition.max_retries > defaults::NUTRITION_MAX_RETRIES_LIMIT {
            bail!(
                "NUTRITION_MAX_RETRIES must be at most {}",
                defaults::NUTRITION_MAX_RETRIES_LIMIT
            );
        }
        if self.nutrition_route_timeout() <= self.nutrition.worst_case_duration() {
            bail!(
                "NUTRITION_TIMEOUT_SECS x (NUTRITION_MAX_RETRIES + 1) exceeds the nutrition route timeout"
            );
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "FitCoach Server Configuration:\n\
             - Environment: {}\n\
             - HTTP: {}:{} (body limit {} bytes, timeout {}s)\n\
             - Database: {} (max connections {})\n\
             - Nutrition API: {} model {} ({}, timeout {}s, {} retries, route timeout {}s)",
            self.environment,
            self.http.host,
            self.http.port,
            self.http.max_body_bytes,
            self.http.request_timeout.as_secs(),
            if self.database.url.contains(":memory:") {
                "in-memory SQLite"
            } else {
                "SQLite"
            },
            self.database.max_connections,
            self.nutrition.base_url,
            self.nutrition.model,
            if self.nutrition.api_key.is_some() {
                "Enabled"
            } else {
                "Disabled"
            },
            self.nutrition.timeout.as_secs(),
            self.nutrition.max_retries,
            self.nutrition_route_timeout().as_secs(),
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(Environment::from_str_or_default("TEST"), Environment::Testing);
        assert_eq!(
            Environment::from_str_or_default("staging"),
            Environment::Development
        );
    }

    #[test]
    fn test_summary_hides_api_key() {
        let mut config = ServerConfig::default();
        config.nutrition.api_key = Some("sk-secret-value".into());
        let summary = config.summary();
        assert!(!summary.contains("sk-secret-value"));
        assert!(summary.contains("Enabled"));
    }

    #[test]
    fn test_production_requires_api_key() {
        let config = ServerConfig {
            environment: Environment::Production,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
