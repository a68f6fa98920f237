// ABOUTME: Domain model module declarations and re-exports
// ABOUTME: Profiles, composite-create documents, outcomes, and nutrition estimates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Food plan documents (plan, days, meals, items)
pub mod food_plan;
/// Lenient numeric fields and validation errors
pub mod numeric;
/// Nutrition estimate returned by the vision passthrough
pub mod nutrition;
/// Tagged results of business operations
pub mod outcomes;
/// Profiles, roles and account provisioning input
pub mod profile;
/// Training program documents (program, days, assignments)
pub mod program;

pub use food_plan::{
    FoodDayDocument, FoodPlanDocument, MealDocument, MealItemDocument, ValidatedFoodDay,
    ValidatedFoodPlan, ValidatedMeal, ValidatedMealItem,
};
pub use numeric::{lookup_id, NumericField, ValidationError};
pub use nutrition::NutritionEstimate;
pub use outcomes::{
    AddClientOutcome, AddClientResponse, AddClientStatus, CreateTreeOutcome, FailureReason,
    FoodPlanCreateResponse, OutcomeStatus, ProgramCreateResponse,
};
pub use profile::{NewAccount, Profile, Role, ValidatedAccount};
pub use program::{
    AssignmentDocument, DayDocument, ProgramDocument, ValidatedAssignment, ValidatedDay,
    ValidatedProgram,
};
