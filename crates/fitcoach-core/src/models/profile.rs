// ABOUTME: Profile and role types plus the account-provisioning input
// ABOUTME: Validates registration metadata supplied by the identity provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::numeric::{identifier, required_text, ValidationError};

/// Application role of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Builds programs and food plans for clients
    Trainer,
    /// Receives programs and logs workouts
    Client,
}

impl Role {
    /// Database representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trainer => "trainer",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trainer" => Ok(Self::Trainer),
            "client" => Ok(Self::Client),
            other => Err(format!("unknown role '{other}', expected trainer or client")),
        }
    }
}

/// Application-level user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Account id from the identity provider
    pub id: String,
    /// Display name
    pub full_name: String,
    /// Unique email
    pub email: String,
    /// Role assigned at registration
    pub role: Role,
    /// RFC 3339 creation time
    pub created_at: String,
}

/// Account registration event sent by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Account id
    pub id: String,
    /// Account email
    pub email: String,
    /// Registration metadata; must contain `full_name` and `role`
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Provisioning input after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAccount {
    /// Canonical account id
    pub id: String,
    /// Trimmed email
    pub email: String,
    /// Trimmed display name
    pub full_name: String,
    /// Parsed role
    pub role: Role,
}

impl NewAccount {
    fn metadata_text(&self, key: &str) -> Result<String, ValidationError> {
        let path = format!("metadata.{key}");
        match self.metadata.get(key) {
            Some(serde_json::Value::String(text)) => required_text(text, &path),
            Some(serde_json::Value::Null) | None => Err(ValidationError::empty(path)),
            Some(other) => Err(ValidationError::invalid(
                path,
                format!("expected text, got {other}"),
            )),
        }
    }

    /// Validate the registration data
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the id, email, name or role is
    /// missing or malformed
    pub fn validate(&self) -> Result<ValidatedAccount, ValidationError> {
        let id = identifier(&self.id, "id")?;
        let email = required_text(&self.email, "email")?;
        if !email.contains('@') {
            return Err(ValidationError::invalid("email", "must be an email address"));
        }
        let full_name = self.metadata_text("full_name")?;
        let role = self
            .metadata_text("role")?
            .parse::<Role>()
            .map_err(|reason| ValidationError::invalid("metadata.role", reason))?;

        Ok(ValidatedAccount {
            id,
            email,
            full_name,
            role,
        })
    }
}
