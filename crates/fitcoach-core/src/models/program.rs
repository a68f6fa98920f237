// ABOUTME: Training program document submitted for composite creation
// ABOUTME: Program -> ordered days -> ordered exercise assignments, validated before any write
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::numeric::{
    identifier, optional_text, required_text, NumericField, ValidationError,
};

/// A full training program as sent by the trainer app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDocument {
    /// Program name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Client the program is written for
    pub client_id: String,
    /// Days in display order
    #[serde(default)]
    pub days: Vec<DayDocument>,
}

/// One training day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayDocument {
    /// Day name, e.g. "Push"
    pub name: String,
    /// Caller-chosen ordering key
    pub day_order: NumericField,
    /// Exercise assignments in display order
    #[serde(default)]
    pub exercises: Vec<AssignmentDocument>,
}

/// One exercise assigned to a day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentDocument {
    /// Library exercise id
    pub exercise_id: String,
    /// Number of sets
    pub sets: NumericField,
    /// Rep target, free-form (e.g. "8-12")
    pub reps: NumericField,
    /// Rest between sets
    #[serde(default)]
    pub rest_period_seconds: Option<NumericField>,
    /// Caller-chosen ordering key within the day
    pub exercise_order: NumericField,
    /// Coaching notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Program ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProgram {
    /// Program name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Target client
    pub client_id: String,
    /// Days in input order
    pub days: Vec<ValidatedDay>,
}

/// Day ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDay {
    /// Day name
    pub name: String,
    /// Ordering key
    pub day_order: i64,
    /// Assignments in input order
    pub exercises: Vec<ValidatedAssignment>,
}

/// Assignment ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAssignment {
    /// Exercise id
    pub exercise_id: String,
    /// Sets, at least one
    pub sets: i64,
    /// Rep target
    pub reps: String,
    /// Rest seconds, non-negative
    pub rest_period_seconds: Option<i64>,
    /// Ordering key
    pub exercise_order: i64,
    /// Notes
    pub notes: Option<String>,
}

impl ProgramDocument {
    /// Validate every field, reporting the first failure with its path
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for blank names, malformed identifiers or
    /// numbers, and out-of-range set or rest values
    pub fn validate(&self) -> Result<ValidatedProgram, ValidationError> {
        let name = required_text(&self.name, "name")?;
        let client_id = identifier(&self.client_id, "client_id")?;
        let days = self
            .days
            .iter()
            .enumerate()
            .map(|(i, day)| day.validate(&format!("days[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidatedProgram {
            name,
            description: optional_text(self.description.as_deref()),
            client_id,
            days,
        })
    }
}

impl DayDocument {
    fn validate(&self, path: &str) -> Result<ValidatedDay, ValidationError> {
        let name = required_text(&self.name, &format!("{path}.name"))?;
        let day_order = self.day_order.to_integer(&format!("{path}.day_order"))?;
        let exercises = self
            .exercises
            .iter()
            .enumerate()
            .map(|(j, assignment)| assignment.validate(&format!("{path}.exercises[{j}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidatedDay {
            name,
            day_order,
            exercises,
        })
    }
}

impl AssignmentDocument {
    fn validate(&self, path: &str) -> Result<ValidatedAssignment, ValidationError> {
        let exercise_id = identifier(&self.exercise_id, &format!("{path}.exercise_id"))?;

        let sets_path = format!("{path}.sets");
        let sets = self.sets.to_integer(&sets_path)?;
        if sets < 1 {
            return Err(ValidationError::out_of_range(sets_path, "must be at least 1"));
        }

        let reps = self.reps.to_text();
        if reps.is_empty() {
            return Err(ValidationError::empty(format!("{path}.reps")));
        }

        let rest_period_seconds = match &self.rest_period_seconds {
            Some(rest) => {
                let rest_path = format!("{path}.rest_period_seconds");
                let seconds = rest.to_integer(&rest_path)?;
                if seconds < 0 {
                    return Err(ValidationError::out_of_range(
                        rest_path,
                        "must not be negative",
                    ));
                }
                Some(seconds)
            }
            None => None,
        };

        Ok(ValidatedAssignment {
            exercise_id,
            sets,
            reps,
            rest_period_seconds,
            exercise_order: self
                .exercise_order
                .to_integer(&format!("{path}.exercise_order"))?,
            notes: optional_text(self.notes.as_deref()),
        })
    }
}
