// ABOUTME: Explicit caller identity passed into every business operation
// ABOUTME: Extracted from the x-caller-id header forwarded by the identity gateway
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Caller context
//!
//! Authentication happens in the identity gateway in front of this service.
//! The gateway forwards the verified profile id in the `x-caller-id` header;
//! handlers receive it as a [`CallerContext`] and hand it to the managers.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::constants::headers::CALLER_ID;
use crate::errors::AppError;

/// The profile on whose behalf an operation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    /// Canonical profile id
    pub profile_id: String,
}

impl CallerContext {
    /// Build a context from a raw id
    ///
    /// # Errors
    ///
    /// Returns an auth error when the id is blank or not a UUID
    pub fn new(profile_id: &str) -> Result<Self, AppError> {
        let trimmed = profile_id.trim();
        if trimmed.is_empty() {
            return Err(AppError::auth_required());
        }
        let id = Uuid::parse_str(trimmed)
            .map_err(|_| AppError::auth_invalid("Caller id is not a valid identifier"))?;
        Ok(Self {
            profile_id: id.to_string(),
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(CALLER_ID)
            .ok_or_else(AppError::auth_required)?;
        let value = header
            .to_str()
            .map_err(|_| AppError::auth_invalid("Caller id header is not valid text"))?;
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_id_is_canonicalized() {
        let id = Uuid::new_v4();
        let upper = id.to_string().to_uppercase();
        assert_eq!(CallerContext::new(&upper).unwrap().profile_id, id.to_string());
    }

    #[test]
    fn test_invalid_caller_ids() {
        assert_eq!(CallerContext::new("  ").unwrap_err().http_status(), 401);
        assert_eq!(CallerContext::new("alice").unwrap_err().http_status(), 401);
    }
}
