use anyhow::Result;
use shared::{Order, OrderStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::storage::money;
use crate::storage::{format_timestamp, parse_timestamp};

/// Repository for order rows
#[derive(Clone)]
pub struct OrderRepository {
    db: DbConnection,
}

impl OrderRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert an order and return the stored row with its generated id
    pub async fn insert_order(&self, order: &Order) -> Result<Order> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (user_id, status, total_amount, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.user_id)
        .bind(order.status.as_str())
        .bind(money::encode_amount(order.total_amount))
        .bind(&order.notes)
        .bind(format_timestamp(&order.created_at))
        .bind(format_timestamp(&order.updated_at))
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.get_order(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("order row {} missing immediately after insert", id))
    }

    /// Get an order by id
    pub async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, status, total_amount, notes, created_at, updated_at
            FROM orders
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

    /// List all orders in insertion order
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, status, total_amount, notes, created_at, updated_at
            FROM orders
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Update an order row in place
    pub async fn update_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET user_id = ?, status = ?, total_amount = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(order.user_id)
        .bind(order.status.as_str())
        .bind(money::encode_amount(order.total_amount))
        .bind(&order.notes)
        .bind(format_timestamp(&order.updated_at))
        .bind(order.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete an order; reports whether a row was actually removed
    pub async fn delete_order(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check whether an order row exists
    pub async fn order_exists(&self, id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    fn map_row(row: &SqliteRow) -> Result<Order> {
        let status: String = row.get("status");
        let total_amount: String = row.get("total_amount");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Order {
            id: row.get("id"),
            user_id: row.get("user_id"),
            status: status.parse::<OrderStatus>().map_err(anyhow::Error::msg)?,
            total_amount: money::decode_amount(&total_amount)?,
            notes: row.get("notes"),
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
