// ABOUTME: Food item library referenced by meal items
// ABOUTME: Names are unique; entries are global or owned by the trainer who added them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::now_timestamp;
use super::profiles::role_of;
use crate::context::CallerContext;
use crate::errors::{AppError, AppResult};
use crate::models::numeric::required_text;
use crate::models::Role;

/// Library food item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    /// Food item id
    pub id: String,
    /// Unique name
    pub name: String,
    /// Owning trainer; `None` for the global library
    pub created_by: Option<String>,
    /// RFC 3339 creation time
    pub created_at: String,
}

fn food_item_from_row(row: &SqliteRow) -> AppResult<FoodItem> {
    Ok(FoodItem {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Food item library operations
pub struct FoodItemsManager {
    pool: SqlitePool,
}

impl FoodItemsManager {
    /// Create a new food items manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a food item owned by the calling trainer
    ///
    /// # Errors
    ///
    /// Returns permission denied for non-trainers, invalid input for a blank
    /// name and already exists for a duplicate name
    pub async fn create_food_item(&self, caller: &CallerContext, name: &str) -> AppResult<FoodItem> {
        if role_of(&self.pool, &caller.profile_id).await? != Some(Role::Trainer) {
            return Err(AppError::permission_denied("Only trainers can add food items"));
        }
        self.insert(name, Some(&caller.profile_id)).await
    }

    /// Add a global food item (seeding)
    ///
    /// # Errors
    ///
    /// Returns invalid input for a blank name and already exists for a
    /// duplicate name
    pub async fn create_global_food_item(&self, name: &str) -> AppResult<FoodItem> {
        self.insert(name, None).await
    }

    async fn insert(&self, name: &str, owner: Option<&str>) -> AppResult<FoodItem> {
        let name =
            required_text(name, "name").map_err(|e| AppError::invalid_input(e.to_string()))?;

        let item = FoodItem {
            id: Uuid::new_v4().to_string(),
            name,
            created_by: owner.map(ToOwned::to_owned),
            created_at: now_timestamp(),
        };

        sqlx::query(
            "INSERT INTO food_items (id, name, created_by, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.created_by)
        .bind(&item.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            conflict if conflict.http_status() == 409 => {
                AppError::already_exists(format!("A food item named '{}' already exists", item.name))
            }
            other => other,
        })?;

        info!(food_item_id = %item.id, name = %item.name, "Created food item");
        Ok(item)
    }

    /// Food items visible to the caller: the global library plus their own
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_food_items(&self, caller: &CallerContext) -> AppResult<Vec<FoodItem>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, created_by, created_at
            FROM food_items
            WHERE created_by IS NULL OR created_by = $1
            ORDER BY name COLLATE NOCASE
            ",
        )
        .bind(&caller.profile_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(food_item_from_row).collect()
    }
}
