// ABOUTME: Tagged results returned by business operations instead of errors
// ABOUTME: Add-client outcomes and composite-create outcomes with their wire shapes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::numeric::ValidationError;

/// Result of a trainer adding a client by email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddClientOutcome {
    /// Link created
    Success {
        /// Linked client profile id
        client_id: String,
    },
    /// The trainer already coaches this client
    AlreadyExists,
    /// No profile has this email
    NotFound,
    /// The profile exists but is not a client
    WrongRole,
    /// The caller is not a trainer
    AccessDenied,
    /// Anything else
    UnexpectedError {
        /// Description of the failure
        message: String,
    },
}

/// Wire status of [`AddClientOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddClientStatus {
    /// Link created
    Success,
    /// Duplicate link
    AlreadyExists,
    /// Unknown email
    NotFound,
    /// Target is not a client
    WrongRole,
    /// Caller is not a trainer
    AccessDenied,
    /// Unexpected failure
    UnexpectedError,
}

/// Wire body for the add-client operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddClientResponse {
    /// Outcome tag
    pub status: AddClientStatus,
    /// Human-readable message
    pub message: String,
    /// Present on success
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub client_id: Option<String>,
}

impl AddClientOutcome {
    /// Wire status
    #[must_use]
    pub const fn status(&self) -> AddClientStatus {
        match self {
            Self::Success { .. } => AddClientStatus::Success,
            Self::AlreadyExists => AddClientStatus::AlreadyExists,
            Self::NotFound => AddClientStatus::NotFound,
            Self::WrongRole => AddClientStatus::WrongRole,
            Self::AccessDenied => AddClientStatus::AccessDenied,
            Self::UnexpectedError { .. } => AddClientStatus::UnexpectedError,
        }
    }

    /// HTTP status used when the outcome is returned over the API
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Success { .. } => 201,
            Self::AlreadyExists => 409,
            Self::NotFound => 404,
            Self::WrongRole => 422,
            Self::AccessDenied => 403,
            Self::UnexpectedError { .. } => 500,
        }
    }

    /// Human-readable message
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Success { .. } => "Client added successfully".to_owned(),
            Self::AlreadyExists => "This client is already on your roster".to_owned(),
            Self::NotFound => "No user found with that email".to_owned(),
            Self::WrongRole => "That user is not registered as a client".to_owned(),
            Self::AccessDenied => "Only trainers can add clients".to_owned(),
            Self::UnexpectedError { message } => format!("Could not add client: {message}"),
        }
    }
}

impl From<AddClientOutcome> for AddClientResponse {
    fn from(outcome: AddClientOutcome) -> Self {
        let status = outcome.status();
        let message = outcome.message();
        let client_id = match outcome {
            AddClientOutcome::Success { client_id } => Some(client_id),
            _ => None,
        };
        Self {
            status,
            message,
            client_id,
        }
    }
}

/// Why a composite create failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The document failed field validation
    Validation,
    /// The caller is not a trainer
    AccessDenied,
    /// The target client does not exist
    ClientNotFound,
    /// The target profile is not a client
    InvalidClient,
    /// A referenced exercise or food item does not exist or is not visible
    ReferenceNotFound,
    /// A uniqueness or foreign-key rule rejected a row
    ConstraintViolation,
    /// Any other database failure
    Database,
}

impl FailureReason {
    /// HTTP status used when the failure is returned over the API
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::AccessDenied => 403,
            Self::ClientNotFound | Self::ReferenceNotFound => 404,
            Self::ConstraintViolation => 409,
            Self::InvalidClient => 422,
            Self::Database => 500,
        }
    }
}

/// Result of a composite create (program or food plan)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateTreeOutcome {
    /// The whole tree was committed
    Created {
        /// Root row id
        id: String,
    },
    /// Nothing was written
    Failed {
        /// Classified cause
        reason: FailureReason,
        /// Human-readable message
        message: String,
    },
}

impl CreateTreeOutcome {
    /// Build a failure
    pub fn failed(reason: FailureReason, message: impl Into<String>) -> Self {
        Self::Failed {
            reason,
            message: message.into(),
        }
    }

    /// Root id when created
    #[must_use]
    pub fn created_id(&self) -> Option<&str> {
        match self {
            Self::Created { id } => Some(id),
            Self::Failed { .. } => None,
        }
    }

    /// Failure reason when failed
    #[must_use]
    pub const fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::Created { .. } => None,
            Self::Failed { reason, .. } => Some(*reason),
        }
    }

    /// HTTP status used when the outcome is returned over the API
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Created { .. } => 201,
            Self::Failed { reason, .. } => reason.http_status(),
        }
    }

    fn into_parts(
        self,
        entity: &str,
    ) -> (OutcomeStatus, String, Option<String>, Option<FailureReason>) {
        match self {
            Self::Created { id } => (
                OutcomeStatus::Success,
                format!("{entity} created successfully"),
                Some(id),
                None,
            ),
            Self::Failed { reason, message } => (OutcomeStatus::Error, message, None, Some(reason)),
        }
    }
}

impl From<ValidationError> for CreateTreeOutcome {
    fn from(error: ValidationError) -> Self {
        Self::failed(FailureReason::Validation, error.to_string())
    }
}

/// Success/error tag of composite-create responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Committed
    Success,
    /// Rolled back
    Error,
}

/// Wire body for program creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramCreateResponse {
    /// Outcome tag
    pub status: OutcomeStatus,
    /// Human-readable message
    pub message: String,
    /// Present on success
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub program_id: Option<String>,
    /// Present on failure
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<FailureReason>,
}

impl From<CreateTreeOutcome> for ProgramCreateResponse {
    fn from(outcome: CreateTreeOutcome) -> Self {
        let (status, message, program_id, reason) = outcome.into_parts("Program");
        Self {
            status,
            message,
            program_id,
            reason,
        }
    }
}

/// Wire body for food plan creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodPlanCreateResponse {
    /// Outcome tag
    pub status: OutcomeStatus,
    /// Human-readable message
    pub message: String,
    /// Present on success
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub food_plan_id: Option<String>,
    /// Present on failure
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<FailureReason>,
}

impl From<CreateTreeOutcome> for FoodPlanCreateResponse {
    fn from(outcome: CreateTreeOutcome) -> Self {
        let (status, message, food_plan_id, reason) = outcome.into_parts("Food plan");
        Self {
            status,
            message,
            food_plan_id,
            reason,
        }
    }
}
