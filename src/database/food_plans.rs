// ABOUTME: Food plans and the all-or-nothing composite food plan creation transaction
// ABOUTME: Writes plan, ordered days, ordered meals and ordered meal items in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::composite::{authorize_tree, TreeFailure};
use super::now_timestamp;
use super::transactions::{retry_transaction, TransactionGuard};
use crate::constants::database::MAX_TRANSACTION_RETRIES;
use crate::context::CallerContext;
use crate::errors::{AppError, AppResult};
use crate::models::{
    lookup_id, CreateTreeOutcome, FailureReason, FoodPlanDocument, ValidatedFoodPlan,
    ValidatedMeal,
};

/// Food plan header row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodPlan {
    /// Plan id
    pub id: String,
    /// Plan name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Authoring trainer
    pub trainer_id: String,
    /// Target client
    pub client_id: String,
    /// RFC 3339 creation time
    pub created_at: String,
}

/// Food plan with its ordered days, meals and items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodPlanTree {
    /// Header
    #[serde(flatten)]
    pub plan: FoodPlan,
    /// Days
    pub days: Vec<FoodPlanDay>,
}

/// Stored food day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodPlanDay {
    /// Day id
    pub id: String,
    /// Day name
    pub name: String,
    /// Ordering key
    pub day_order: i64,
    /// Meals
    pub meals: Vec<FoodPlanMeal>,
}

/// Stored meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodPlanMeal {
    /// Meal id
    pub id: String,
    /// Meal name
    pub name: String,
    /// Ordering key
    pub meal_order: i64,
    /// Items
    pub items: Vec<FoodPlanMealItem>,
}

/// Stored meal item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodPlanMealItem {
    /// Item id
    pub id: String,
    /// Food item id
    pub food_item_id: String,
    /// Food item name
    pub food_item_name: String,
    /// Free-form quantity
    pub quantity: String,
    /// Ordering key
    pub item_order: i64,
    /// Notes
    pub notes: Option<String>,
}

fn plan_from_row(row: &SqliteRow) -> AppResult<FoodPlan> {
    Ok(FoodPlan {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        trainer_id: row.try_get("trainer_id")?,
        client_id: row.try_get("client_id")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Food plan operations
pub struct FoodPlansManager {
    pool: SqlitePool,
}

impl FoodPlansManager {
    /// Create a new food plans manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a whole food plan tree atomically.
    ///
    /// Same contract as program creation, with food items (global or owned
    /// by the caller) in place of exercises.
    #[instrument(skip(self, document), fields(caller = %caller.profile_id))]
    pub async fn create_food_plan(
        &self,
        caller: &CallerContext,
        document: &FoodPlanDocument,
    ) -> CreateTreeOutcome {
        let plan = match document.validate() {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, "Food plan document rejected");
                return e.into();
            }
        };

        let plan = &plan;
        let result = retry_transaction(
            move || self.insert_plan_tree(caller, plan),
            MAX_TRANSACTION_RETRIES,
        )
        .await;

        match result {
            Ok(food_plan_id) => {
                info!(
                    food_plan_id = %food_plan_id,
                    client_id = %plan.client_id,
                    days = plan.days.len(),
                    "Created food plan"
                );
                CreateTreeOutcome::Created { id: food_plan_id }
            }
            Err(failure) => {
                if failure.reason() == FailureReason::Database {
                    error!(error = %failure, "Food plan creation failed");
                } else {
                    warn!(error = %failure, "Food plan creation rejected");
                }
                failure.into()
            }
        }
    }

    async fn insert_plan_tree(
        &self,
        caller: &CallerContext,
        plan: &ValidatedFoodPlan,
    ) -> Result<String, TreeFailure> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TreeFailure::from_sqlx("transaction", &e))?;
        let mut guard = TransactionGuard::new(tx);
        let conn = guard.executor()?;

        authorize_tree(conn, caller, &plan.client_id, "food plan").await?;

        let food_plan_id = Uuid::new_v4().to_string();
        sqlx::query(
            r"
            INSERT INTO food_plans (id, name, description, trainer_id, client_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&food_plan_id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(&caller.profile_id)
        .bind(&plan.client_id)
        .bind(now_timestamp())
        .execute(&mut *conn)
        .await
        .map_err(|e| TreeFailure::from_sqlx("food plan", &e))?;

        for (i, day) in plan.days.iter().enumerate() {
            let day_path = format!("days[{i}]");
            let day_id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO food_days (id, food_plan_id, name, day_order) VALUES ($1, $2, $3, $4)",
            )
            .bind(&day_id)
            .bind(&food_plan_id)
            .bind(&day.name)
            .bind(day.day_order)
            .execute(&mut *conn)
            .await
            .map_err(|e| TreeFailure::from_sqlx(&day_path, &e))?;

            for (j, meal) in day.meals.iter().enumerate() {
                let meal_path = format!("{day_path}.meals[{j}]");
                insert_meal(conn, caller, &day_id, meal, &meal_path).await?;
            }
        }

        guard.commit().await?;
        Ok(food_plan_id)
    }

    /// Get a food plan tree visible to the caller (its trainer or its client)
    ///
    /// # Errors
    ///
    /// Returns not found when the plan does not exist or is not visible
    pub async fn get_food_plan(
        &self,
        caller: &CallerContext,
        food_plan_id: &str,
    ) -> AppResult<FoodPlanTree> {
        let food_plan_id = lookup_id(food_plan_id);
        let food_plan_id = food_plan_id.as_str();
        let row = sqlx::query(
            r"
            SELECT id, name, description, trainer_id, client_id, created_at
            FROM food_plans
            WHERE id = $1 AND (trainer_id = $2 OR client_id = $2)
            ",
        )
        .bind(food_plan_id)
        .bind(&caller.profile_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Food plan"))?;
        let plan = plan_from_row(&row)?;

        let item_rows = sqlx::query(
            r"
            SELECT i.id, i.meal_id, i.food_item_id, f.name AS food_item_name, i.quantity,
                   i.item_order, i.notes
            FROM meal_items i
            JOIN meals m ON m.id = i.meal_id
            JOIN food_days d ON d.id = m.food_day_id
            JOIN food_items f ON f.id = i.food_item_id
            WHERE d.food_plan_id = $1
            ORDER BY i.item_order, i.rowid
            ",
        )
        .bind(food_plan_id)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_meal: HashMap<String, Vec<FoodPlanMealItem>> = HashMap::new();
        for row in &item_rows {
            let meal_id: String = row.try_get("meal_id")?;
            items_by_meal.entry(meal_id).or_default().push(FoodPlanMealItem {
                id: row.try_get("id")?,
                food_item_id: row.try_get("food_item_id")?,
                food_item_name: row.try_get("food_item_name")?,
                quantity: row.try_get("quantity")?,
                item_order: row.try_get("item_order")?,
                notes: row.try_get("notes")?,
            });
        }

        let meal_rows = sqlx::query(
            r"
            SELECT m.id, m.food_day_id, m.name, m.meal_order
            FROM meals m
            JOIN food_days d ON d.id = m.food_day_id
            WHERE d.food_plan_id = $1
            ORDER BY m.meal_order, m.rowid
            ",
        )
        .bind(food_plan_id)
        .fetch_all(&self.pool)
        .await?;

        let mut meals_by_day: HashMap<String, Vec<FoodPlanMeal>> = HashMap::new();
        for row in &meal_rows {
            let day_id: String = row.try_get("food_day_id")?;
            let id: String = row.try_get("id")?;
            meals_by_day.entry(day_id).or_default().push(FoodPlanMeal {
                items: items_by_meal.remove(&id).unwrap_or_default(),
                id,
                name: row.try_get("name")?,
                meal_order: row.try_get("meal_order")?,
            });
        }

        let day_rows = sqlx::query(
            r"
            SELECT id, name, day_order FROM food_days
            WHERE food_plan_id = $1
            ORDER BY day_order, rowid
            ",
        )
        .bind(food_plan_id)
        .fetch_all(&self.pool)
        .await?;

        let days = day_rows
            .iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                Ok(FoodPlanDay {
                    meals: meals_by_day.remove(&id).unwrap_or_default(),
                    id,
                    name: row.try_get("name")?,
                    day_order: row.try_get("day_order")?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(FoodPlanTree { plan, days })
    }

    /// Food plans where the caller is the trainer or the client, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_food_plans(&self, caller: &CallerContext) -> AppResult<Vec<FoodPlan>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, trainer_id, client_id, created_at
            FROM food_plans
            WHERE trainer_id = $1 OR client_id = $1
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .bind(&caller.profile_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(plan_from_row).collect()
    }

    /// Delete a food plan and its whole tree; trainer only
    ///
    /// # Errors
    ///
    /// Returns not found when the caller is not the plan's trainer or the
    /// plan does not exist
    pub async fn delete_food_plan(&self, caller: &CallerContext, food_plan_id: &str) -> AppResult<()> {
        let food_plan_id = lookup_id(food_plan_id);
        let food_plan_id = food_plan_id.as_str();
        let result = sqlx::query("DELETE FROM food_plans WHERE id = $1 AND trainer_id = $2")
            .bind(food_plan_id)
            .bind(&caller.profile_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Food plan"));
        }
        info!(food_plan_id = %food_plan_id, "Deleted food plan");
        Ok(())
    }
}

async fn insert_meal(
    conn: &mut SqliteConnection,
    caller: &CallerContext,
    day_id: &str,
    meal: &ValidatedMeal,
    meal_path: &str,
) -> Result<(), TreeFailure> {
    let meal_id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO meals (id, food_day_id, name, meal_order) VALUES ($1, $2, $3, $4)")
        .bind(&meal_id)
        .bind(day_id)
        .bind(&meal.name)
        .bind(meal.meal_order)
        .execute(&mut *conn)
        .await
        .map_err(|e| TreeFailure::from_sqlx(meal_path, &e))?;

    for (k, item) in meal.items.iter().enumerate() {
        let path = format!("{meal_path}.items[{k}]");

        let visible = sqlx::query(
            "SELECT 1 FROM food_items WHERE id = $1 AND (created_by IS NULL OR created_by = $2)",
        )
        .bind(&item.food_item_id)
        .bind(&caller.profile_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| TreeFailure::from_sqlx(&path, &e))?;
        if visible.is_none() {
            return Err(TreeFailure::new(
                FailureReason::ReferenceNotFound,
                format!("{path}.food_item_id: food item {} not found", item.food_item_id),
            ));
        }

        sqlx::query(
            r"
            INSERT INTO meal_items (id, meal_id, food_item_id, quantity, item_order, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&meal_id)
        .bind(&item.food_item_id)
        .bind(&item.quantity)
        .bind(item.item_order)
        .bind(&item.notes)
        .execute(&mut *conn)
        .await
        .map_err(|e| TreeFailure::from_sqlx(&path, &e))?;
    }
    Ok(())
}
