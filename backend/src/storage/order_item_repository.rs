use anyhow::Result;
use shared::OrderItem;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::storage::money;
use crate::storage::{format_timestamp, parse_timestamp};

/// Repository for order item rows
#[derive(Clone)]
pub struct OrderItemRepository {
    db: DbConnection,
}

impl OrderItemRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert an order item and return the stored row with its generated id
    pub async fn insert_order_item(&self, item: &OrderItem) -> Result<OrderItem> {
        let result = sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(money::encode_amount(item.unit_price))
        .bind(money::encode_amount(item.subtotal))
        .bind(format_timestamp(&item.created_at))
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.get_order_item(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("order item row {} missing immediately after insert", id))
    }

    /// Get an order item by id
    pub async fn get_order_item(&self, id: i64) -> Result<Option<OrderItem>> {
        let row = sqlx::query(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price, subtotal, created_at
            FROM order_items
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

    /// List all order items in insertion order
    pub async fn list_order_items(&self) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price, subtotal, created_at
            FROM order_items
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// List the items belonging to one order, in insertion order
    pub async fn list_order_items_by_order(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price, subtotal, created_at
            FROM order_items
            WHERE order_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Update an order item row in place
    pub async fn update_order_item(&self, item: &OrderItem) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE order_items
            SET order_id = ?, product_id = ?, quantity = ?, unit_price = ?, subtotal = ?
            WHERE id = ?
            "#,
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(money::encode_amount(item.unit_price))
        .bind(money::encode_amount(item.subtotal))
        .bind(item.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete an order item; reports whether a row was actually removed
    pub async fn delete_order_item(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM order_items WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn map_row(row: &SqliteRow) -> Result<OrderItem> {
        let unit_price: String = row.get("unit_price");
        let subtotal: String = row.get("subtotal");
        let created_at: String = row.get("created_at");

        Ok(OrderItem {
            id: row.get("id"),
            order_id: row.get("order_id"),
            product_id: row.get("product_id"),
            quantity: row.get("quantity"),
            unit_price: money::decode_amount(&unit_price)?,
            subtotal: money::decode_amount(&subtotal)?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}
