use anyhow::Result;
use shared::{User, UserRole};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::storage::{format_timestamp, parse_timestamp};

/// Repository for user rows
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a user and return the stored row with its generated id
    pub async fn insert_user(&self, user: &User) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, role, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(format_timestamp(&user.created_at))
        .bind(format_timestamp(&user.updated_at))
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.get_user(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user row {} missing immediately after insert", id))
    }

    /// Get a user by id
    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, role, is_active, created_at, updated_at
            FROM users
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

    /// List all users in insertion order
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, role, is_active, created_at, updated_at
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Update a user row in place
    pub async fn update_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, role = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(format_timestamp(&user.updated_at))
        .bind(user.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a user; reports whether a row was actually removed
    pub async fn delete_user(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check whether a user row exists
    pub async fn user_exists(&self, id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    fn map_row(row: &SqliteRow) -> Result<User> {
        let role: String = row.get("role");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            role: role.parse::<UserRole>().map_err(anyhow::Error::msg)?,
            is_active: row.get("is_active"),
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
