use chrono::Utc;
use shared::{CreateOrderItemRequest, DeleteResponse, OrderItem, UpdateOrderItemRequest};
use tracing::{info, warn};

use crate::db::DbConnection;
use crate::domain::{
    validate_non_negative_amount, validate_positive_amount, validate_positive_quantity,
};
use crate::error::DomainError;
use crate::storage::order_item_repository::OrderItemRepository;
use crate::storage::order_repository::OrderRepository;
use crate::storage::product_repository::ProductRepository;

/// Service for managing order lines.
///
/// A line must reference an existing order and product; both checks run
/// before the insert so an invalid line never exists, even transiently.
#[derive(Clone)]
pub struct OrderItemService {
    order_items: OrderItemRepository,
    orders: OrderRepository,
    products: ProductRepository,
}

impl OrderItemService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            order_items: OrderItemRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db),
        }
    }

    /// Create a new order line
    pub async fn create_order_item(
        &self,
        request: CreateOrderItemRequest,
    ) -> Result<OrderItem, DomainError> {
        info!(
            "Creating order item: order={} product={}",
            request.order_id, request.product_id
        );

        validate_positive_quantity("quantity", request.quantity)?;
        validate_positive_amount("unit_price", request.unit_price)?;
        validate_non_negative_amount("subtotal", request.subtotal)?;

        if !self.orders.order_exists(request.order_id).await? {
            return Err(DomainError::MissingReference {
                entity: "order",
                id: request.order_id,
            });
        }
        if !self.products.product_exists(request.product_id).await? {
            return Err(DomainError::MissingReference {
                entity: "product",
                id: request.product_id,
            });
        }

        let item = OrderItem {
            id: 0, // assigned by storage
            order_id: request.order_id,
            product_id: request.product_id,
            quantity: request.quantity,
            unit_price: request.unit_price,
            subtotal: request.subtotal,
            created_at: Utc::now(),
        };

        let stored = self.order_items.insert_order_item(&item).await?;

        info!("Created order item {} on order {}", stored.id, stored.order_id);
        Ok(stored)
    }

    /// List all order lines in insertion order
    pub async fn list_order_items(&self) -> Result<Vec<OrderItem>, DomainError> {
        let items = self.order_items.list_order_items().await?;
        info!("Found {} order items", items.len());
        Ok(items)
    }

    /// Get an order line by id; absence is not an error
    pub async fn get_order_item(&self, id: i64) -> Result<Option<OrderItem>, DomainError> {
        let item = self.order_items.get_order_item(id).await?;
        if item.is_none() {
            warn!("Order item not found: {}", id);
        }
        Ok(item)
    }

    /// List the lines belonging to one order, in insertion order
    pub async fn get_order_items_by_order(&self, order_id: i64) -> Result<Vec<OrderItem>, DomainError> {
        let items = self.order_items.list_order_items_by_order(order_id).await?;
        info!("Found {} order items for order {}", items.len(), order_id);
        Ok(items)
    }

    /// Update an existing order line; only supplied fields change.
    /// Newly supplied order or product references are checked before
    /// anything is written.
    pub async fn update_order_item(
        &self,
        request: UpdateOrderItemRequest,
    ) -> Result<OrderItem, DomainError> {
        info!("Updating order item: {}", request.id);

        let mut item = self
            .order_items
            .get_order_item(request.id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "order item",
                id: request.id,
            })?;

        if let Some(order_id) = request.order_id {
            if !self.orders.order_exists(order_id).await? {
                return Err(DomainError::MissingReference {
                    entity: "order",
                    id: order_id,
                });
            }
            item.order_id = order_id;
        }
        if let Some(product_id) = request.product_id {
            if !self.products.product_exists(product_id).await? {
                return Err(DomainError::MissingReference {
                    entity: "product",
                    id: product_id,
                });
            }
            item.product_id = product_id;
        }
        if let Some(quantity) = request.quantity {
            validate_positive_quantity("quantity", quantity)?;
            item.quantity = quantity;
        }
        if let Some(unit_price) = request.unit_price {
            validate_positive_amount("unit_price", unit_price)?;
            item.unit_price = unit_price;
        }
        if let Some(subtotal) = request.subtotal {
            validate_non_negative_amount("subtotal", subtotal)?;
            item.subtotal = subtotal;
        }

        self.order_items.update_order_item(&item).await?;

        info!("Updated order item {}", item.id);
        Ok(item)
    }

    /// Delete an order line; missing rows are reported, not raised
    pub async fn delete_order_item(&self, id: i64) -> Result<DeleteResponse, DomainError> {
        info!("Deleting order item: {}", id);

        let removed = self.order_items.delete_order_item(id).await?;
        if !removed {
            warn!("Nothing to delete, order item not found: {}", id);
        }

        Ok(DeleteResponse { success: removed })
    }
}
