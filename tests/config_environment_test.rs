// ABOUTME: Tests for environment-driven server configuration
// ABOUTME: Defaults, overrides, malformed values and production requirements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::time::Duration;

use fitcoach_server::config::{Environment, ServerConfig};
use serial_test::serial;

const VARIABLES: &[&str] = &[
    "ENVIRONMENT",
    "HTTP_HOST",
    "HTTP_PORT",
    "HTTP_MAX_BODY_BYTES",
    "HTTP_REQUEST_TIMEOUT_SECS",
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "NUTRITION_API_BASE_URL",
    "NUTRITION_API_KEY",
    "NUTRITION_MODEL",
    "NUTRITION_TIMEOUT_SECS",
    "NUTRITION_MAX_RETRIES",
];

fn clear_environment() {
    for variable in VARIABLES {
        env::remove_var(variable);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_environment();

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.http.port, 8081);
    assert_eq!(config.database.url, "sqlite:./data/fitcoach.db");
    assert_eq!(config.nutrition.base_url, "https://api.openai.com/v1");
    assert!(config.nutrition.api_key.is_none());
    assert_eq!(config.nutrition.timeout, Duration::from_secs(30));
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_environment();
    env::set_var("HTTP_PORT", "9090");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("NUTRITION_API_KEY", "  sk-live  ");
    env::set_var("NUTRITION_MODEL", "gpt-4o");
    env::set_var("NUTRITION_TIMEOUT_SECS", "12");
    env::set_var("NUTRITION_MAX_RETRIES", "0");

    let config = ServerConfig::from_env().unwrap();
    clear_environment();

    assert_eq!(config.http.port, 9090);
    assert_eq!(config.database.url, "sqlite::memory:");
    assert_eq!(config.nutrition.api_key.as_deref(), Some("sk-live"));
    assert_eq!(config.nutrition.model, "gpt-4o");
    assert_eq!(config.nutrition.timeout, Duration::from_secs(12));
    assert_eq!(config.nutrition.max_retries, 0);
    assert!(config.summary().contains("in-memory SQLite"));
    assert!(!config.summary().contains("sk-live"));
}

#[test]
#[serial]
fn test_blank_api_key_is_treated_as_missing() {
    clear_environment();
    env::set_var("NUTRITION_API_KEY", "   ");

    let config = ServerConfig::from_env().unwrap();
    clear_environment();
    assert!(config.nutrition.api_key.is_none());
}

#[test]
#[serial]
fn test_malformed_number_is_rejected() {
    clear_environment();
    env::set_var("HTTP_PORT", "eighty");

    let err = ServerConfig::from_env().unwrap_err();
    clear_environment();
    assert!(err.to_string().contains("HTTP_PORT"), "{err}");
}

#[test]
#[serial]
fn test_production_requires_nutrition_key() {
    clear_environment();
    env::set_var("ENVIRONMENT", "production");

    assert!(ServerConfig::from_env().is_err());

    env::set_var("NUTRITION_API_KEY", "sk-live");
    let config = ServerConfig::from_env().unwrap();
    clear_environment();
    assert!(config.environment.is_production());
}

#[test]
#[serial]
fn test_zero_limits_are_rejected() {
    clear_environment();
    env::set_var("DATABASE_MAX_CONNECTIONS", "0");
    assert!(ServerConfig::from_env().is_err());
    clear_environment();

    env::set_var("NUTRITION_TIMEOUT_SECS", "0");
    assert!(ServerConfig::from_env().is_err());
    clear_environment();
}

#[test]
#[serial]
fn test_zero_request_timeout_is_rejected() {
    clear_environment();
    env::set_var("HTTP_REQUEST_TIMEOUT_SECS", "0");

    let err = ServerConfig::from_env().unwrap_err();
    clear_environment();
    assert!(err.to_string().contains("HTTP_REQUEST_TIMEOUT_SECS"), "{err}");
}

#[test]
#[serial]
fn test_nutrition_route_outlasts_retry_budget() {
    clear_environment();

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.nutrition.worst_case_duration(), Duration::from_millis(90_750));
    assert!(config.nutrition_route_timeout() > config.nutrition.worst_case_duration());
    assert!(config.nutrition_route_timeout() > config.http.request_timeout);
    assert!(config.summary().contains("route timeout"));
}

#[test]
#[serial]
fn test_excessive_retries_are_rejected() {
    clear_environment();
    env::set_var("NUTRITION_MAX_RETRIES", "11");
    assert!(ServerConfig::from_env().is_err());

    env::set_var("NUTRITION_MAX_RETRIES", "10");
    let config = ServerConfig::from_env().unwrap();
    clear_environment();
    assert_eq!(config.nutrition.max_retries, 10);
}

#[test]
#[serial]
fn test_unbounded_attempt_timeout_is_rejected() {
    clear_environment();
    env::set_var("NUTRITION_TIMEOUT_SECS", u64::MAX.to_string());

    let err = ServerConfig::from_env().unwrap_err();
    clear_environment();
    assert!(err.to_string().contains("nutrition route timeout"), "{err}");
}
