// ABOUTME: Food plan document submitted for composite creation
// ABOUTME: Plan -> ordered days -> ordered meals -> ordered meal items
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::numeric::{
    identifier, optional_text, required_text, NumericField, ValidationError,
};

/// A full food plan as sent by the trainer app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodPlanDocument {
    /// Plan name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Client the plan is written for
    pub client_id: String,
    /// Days in display order
    #[serde(default)]
    pub days: Vec<FoodDayDocument>,
}

/// One day of a food plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodDayDocument {
    /// Day name
    pub name: String,
    /// Caller-chosen ordering key
    pub day_order: NumericField,
    /// Meals in display order
    #[serde(default)]
    pub meals: Vec<MealDocument>,
}

/// One meal of a day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealDocument {
    /// Meal name, e.g. "Breakfast"
    pub name: String,
    /// Caller-chosen ordering key within the day
    pub meal_order: NumericField,
    /// Items in display order
    #[serde(default)]
    pub items: Vec<MealItemDocument>,
}

/// One food item of a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealItemDocument {
    /// Library food item id
    pub food_item_id: String,
    /// Portion, free-form (e.g. "150 g", 2)
    pub quantity: NumericField,
    /// Caller-chosen ordering key within the meal
    pub item_order: NumericField,
    /// Notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Food plan ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFoodPlan {
    /// Plan name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Target client
    pub client_id: String,
    /// Days in input order
    pub days: Vec<ValidatedFoodDay>,
}

/// Food day ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFoodDay {
    /// Day name
    pub name: String,
    /// Ordering key
    pub day_order: i64,
    /// Meals in input order
    pub meals: Vec<ValidatedMeal>,
}

/// Meal ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMeal {
    /// Meal name
    pub name: String,
    /// Ordering key
    pub meal_order: i64,
    /// Items in input order
    pub items: Vec<ValidatedMealItem>,
}

/// Meal item ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMealItem {
    /// Food item id
    pub food_item_id: String,
    /// Portion text
    pub quantity: String,
    /// Ordering key
    pub item_order: i64,
    /// Notes
    pub notes: Option<String>,
}

impl FoodPlanDocument {
    /// Validate every field, reporting the first failure with its path
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for blank names or quantities and
    /// malformed identifiers or ordering numbers
    pub fn validate(&self) -> Result<ValidatedFoodPlan, ValidationError> {
        let name = required_text(&self.name, "name")?;
        let client_id = identifier(&self.client_id, "client_id")?;
        let days = self
            .days
            .iter()
            .enumerate()
            .map(|(i, day)| day.validate(&format!("days[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidatedFoodPlan {
            name,
            description: optional_text(self.description.as_deref()),
            client_id,
            days,
        })
    }
}

impl FoodDayDocument {
    fn validate(&self, path: &str) -> Result<ValidatedFoodDay, ValidationError> {
        Ok(ValidatedFoodDay {
            name: required_text(&self.name, &format!("{path}.name"))?,
            day_order: self.day_order.to_integer(&format!("{path}.day_order"))?,
            meals: self
                .meals
                .iter()
                .enumerate()
                .map(|(j, meal)| meal.validate(&format!("{path}.meals[{j}]")))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl MealDocument {
    fn validate(&self, path: &str) -> Result<ValidatedMeal, ValidationError> {
        Ok(ValidatedMeal {
            name: required_text(&self.name, &format!("{path}.name"))?,
            meal_order: self.meal_order.to_integer(&format!("{path}.meal_order"))?,
            items: self
                .items
                .iter()
                .enumerate()
                .map(|(k, item)| item.validate(&format!("{path}.items[{k}]")))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl MealItemDocument {
    fn validate(&self, path: &str) -> Result<ValidatedMealItem, ValidationError> {
        let food_item_id = identifier(&self.food_item_id, &format!("{path}.food_item_id"))?;
        let quantity = self.quantity.to_text();
        if quantity.is_empty() {
            return Err(ValidationError::empty(format!("{path}.quantity")));
        }
        Ok(ValidatedMealItem {
            food_item_id,
            quantity,
            item_order: self.item_order.to_integer(&format!("{path}.item_order"))?,
            notes: optional_text(self.notes.as_deref()),
        })
    }
}
