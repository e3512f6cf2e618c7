use anyhow::Result;
use shared::Product;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::storage::money;
use crate::storage::{format_timestamp, parse_timestamp};

/// Repository for product rows
#[derive(Clone)]
pub struct ProductRepository {
    db: DbConnection,
}

impl ProductRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a product and return the stored row with its generated id
    pub async fn insert_product(&self, product: &Product) -> Result<Product> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, description, price, stock_quantity, category_id, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(money::encode_amount(product.price))
        .bind(product.stock_quantity)
        .bind(product.category_id)
        .bind(product.is_active)
        .bind(format_timestamp(&product.created_at))
        .bind(format_timestamp(&product.updated_at))
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.get_product(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("product row {} missing immediately after insert", id))
    }

    /// Get a product by id
    pub async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, price, stock_quantity, category_id, is_active, created_at, updated_at
            FROM products
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

    /// List all products in insertion order
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price, stock_quantity, category_id, is_active, created_at, updated_at
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Update a product row in place
    pub async fn update_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET name = ?, description = ?, price = ?, stock_quantity = ?, category_id = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(money::encode_amount(product.price))
        .bind(product.stock_quantity)
        .bind(product.category_id)
        .bind(product.is_active)
        .bind(format_timestamp(&product.updated_at))
        .bind(product.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a product; reports whether a row was actually removed
    pub async fn delete_product(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check whether a product row exists
    pub async fn product_exists(&self, id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    fn map_row(row: &SqliteRow) -> Result<Product> {
        let price: String = row.get("price");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Product {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            price: money::decode_amount(&price)?,
            stock_quantity: row.get("stock_quantity"),
            category_id: row.get("category_id"),
            is_active: row.get("is_active"),
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
