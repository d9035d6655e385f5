//! # Menu Repository
//!
//! Read side for the storefront menu, plus the inserts the seed tool needs.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use bistro_core::validation::{validate_menu_item_name, validate_price};
use bistro_core::{CoreError, MenuItem};

const MENU_COLUMNS: &str = "id, name, description, category, price_cents, is_available, created_at, updated_at";

/// Fields for inserting a menu item; the database assigns the id.
#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price_cents: i64,
    pub is_available: bool,
}

impl NewMenuItem {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price_cents: i64) -> Self {
        NewMenuItem {
            name: name.into(),
            description: None,
            category: category.into(),
            price_cents,
            is_available: true,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }
}

/// Repository for menu database operations.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    /// Available items, grouped by category then name.
    pub async fn list_available(&self) -> DbResult<Vec<MenuItem>> {
        let sql = format!(
            "SELECT {MENU_COLUMNS} FROM menu_items WHERE is_available = 1 ORDER BY category, name"
        );
        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Listed available menu items");
        Ok(items)
    }

    /// Gets an item by id, available or not.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<MenuItem>> {
        let sql = format!("SELECT {MENU_COLUMNS} FROM menu_items WHERE id = ?1");
        let item = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Loads several items at once, keyed by id. Missing ids are absent.
    pub async fn get_many(&self, ids: &[i64]) -> DbResult<HashMap<i64, MenuItem>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {MENU_COLUMNS} FROM menu_items WHERE id IN ("));
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let items = qb
            .build_query_as::<MenuItem>()
            .fetch_all(&self.pool)
            .await?;

        Ok(items.into_iter().map(|m| (m.id, m)).collect())
    }

    /// Inserts a menu item and returns the stored row.
    pub async fn insert(&self, item: &NewMenuItem) -> DbResult<MenuItem> {
        validate_menu_item_name(&item.name).map_err(CoreError::from)?;
        validate_price(item.price_cents).map_err(CoreError::from)?;

        let now = Utc::now();
        debug!(name = %item.name, price_cents = item.price_cents, "Inserting menu item");

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO menu_items (
                name, description, category, price_cents, is_available, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING id
            "#,
        )
        .bind(item.name.trim())
        .bind(&item.description)
        .bind(&item.category)
        .bind(item.price_cents)
        .bind(item.is_available)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(MenuItem {
            id,
            name: item.name.trim().to_string(),
            description: item.description.clone(),
            category: item.category.clone(),
            price_cents: item.price_cents,
            is_available: item.is_available,
            created_at: now,
            updated_at: now,
        })
    }

    /// Marks an item as (un)available. Returns false for unknown ids.
    pub async fn set_available(&self, id: i64, available: bool) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE menu_items SET is_available = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(available)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts all menu items (the seed tool uses this to skip reseeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
