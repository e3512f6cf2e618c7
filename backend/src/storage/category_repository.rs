use anyhow::Result;
use shared::Category;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::storage::{format_timestamp, parse_timestamp};

/// Repository for category rows
#[derive(Clone)]
pub struct CategoryRepository {
    db: DbConnection,
}

impl CategoryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a category and return the stored row with its generated id
    pub async fn insert_category(&self, category: &Category) -> Result<Category> {
        let result = sqlx::query(
            r#"
            INSERT INTO categories (name, description, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(format_timestamp(&category.created_at))
        .bind(format_timestamp(&category.updated_at))
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.get_category(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("category row {} missing immediately after insert", id))
    }

    /// Get a category by id
    pub async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM categories
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(Self::map_row(&r)?)),
            None => Ok(None),
        }
    }

    /// List all categories in insertion order
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM categories
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Update a category row in place
    pub async fn update_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE categories
            SET name = ?, description = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(format_timestamp(&category.updated_at))
        .bind(category.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a category; reports whether a row was actually removed
    pub async fn delete_category(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn map_row(row: &SqliteRow) -> Result<Category> {
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Category {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            is_active: row.get("is_active"),
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
