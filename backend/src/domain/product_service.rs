use chrono::Utc;
use shared::{CreateProductRequest, DeleteResponse, Product, UpdateProductRequest};
use tracing::{info, warn};

use crate::db::DbConnection;
use crate::domain::{validate_name, validate_non_negative_quantity, validate_positive_amount};
use crate::error::DomainError;
use crate::storage::product_repository::ProductRepository;

/// Service for managing the product catalog.
///
/// `category_id` is stored as supplied without an existence check; category
/// deletion does not cascade, so dangling references are an accepted state.
#[derive(Clone)]
pub struct ProductService {
    products: ProductRepository,
}

impl ProductService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    /// Create a new product with defaults applied
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<Product, DomainError> {
        info!("Creating product: name={}", request.name);

        let name = validate_name("name", &request.name)?;
        validate_positive_amount("price", request.price)?;
        let stock_quantity = request.stock_quantity.unwrap_or(0);
        validate_non_negative_quantity("stock_quantity", stock_quantity)?;

        let now = Utc::now();
        let product = Product {
            id: 0, // assigned by storage
            name,
            description: request.description,
            price: request.price,
            stock_quantity,
            category_id: request.category_id,
            is_active: request.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let stored = self.products.insert_product(&product).await?;

        info!("Created product {} with id {}", stored.name, stored.id);
        Ok(stored)
    }

    /// List all products in insertion order
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let products = self.products.list_products().await?;
        info!("Found {} products", products.len());
        Ok(products)
    }

    /// Get a product by id; absence is not an error
    pub async fn get_product(&self, id: i64) -> Result<Option<Product>, DomainError> {
        let product = self.products.get_product(id).await?;
        if product.is_none() {
            warn!("Product not found: {}", id);
        }
        Ok(product)
    }

    /// Update an existing product; only supplied fields change
    pub async fn update_product(
        &self,
        request: UpdateProductRequest,
    ) -> Result<Product, DomainError> {
        info!("Updating product: {}", request.id);

        let mut product = self
            .products
            .get_product(request.id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "product",
                id: request.id,
            })?;

        if let Some(name) = request.name {
            product.name = validate_name("name", &name)?;
        }
        if let Some(description) = request.description {
            product.description = Some(description);
        }
        if let Some(price) = request.price {
            validate_positive_amount("price", price)?;
            product.price = price;
        }
        if let Some(stock_quantity) = request.stock_quantity {
            validate_non_negative_quantity("stock_quantity", stock_quantity)?;
            product.stock_quantity = stock_quantity;
        }
        if let Some(category_id) = request.category_id {
            product.category_id = Some(category_id);
        }
        if let Some(is_active) = request.is_active {
            product.is_active = is_active;
        }

        product.updated_at = Utc::now();
        self.products.update_product(&product).await?;

        info!("Updated product {} with id {}", product.name, product.id);
        Ok(product)
    }

    /// Delete a product; missing rows are reported, not raised
    pub async fn delete_product(&self, id: i64) -> Result<DeleteResponse, DomainError> {
        info!("Deleting product: {}", id);

        let removed = self.products.delete_product(id).await?;
        if !removed {
            warn!("Nothing to delete, product not found: {}", id);
        }

        Ok(DeleteResponse { success: removed })
    }
}
