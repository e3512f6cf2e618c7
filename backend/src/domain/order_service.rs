use chrono::Utc;
use shared::{CreateOrderRequest, DeleteResponse, Order, UpdateOrderRequest};
use tracing::{info, warn};

use crate::db::DbConnection;
use crate::domain::validate_non_negative_amount;
use crate::error::DomainError;
use crate::storage::order_repository::OrderRepository;
use crate::storage::user_repository::UserRepository;

/// Service for managing orders.
///
/// An order must reference an existing user; the check runs before the
/// insert so an order with a dangling user never exists, even transiently.
#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    users: UserRepository,
}

impl OrderService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    /// Create a new order with defaults applied
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, DomainError> {
        info!("Creating order for user {}", request.user_id);

        validate_non_negative_amount("total_amount", request.total_amount)?;

        if !self.users.user_exists(request.user_id).await? {
            return Err(DomainError::MissingReference {
                entity: "user",
                id: request.user_id,
            });
        }

        let now = Utc::now();
        let order = Order {
            id: 0, // assigned by storage
            user_id: request.user_id,
            status: request.status.unwrap_or_default(),
            total_amount: request.total_amount,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let stored = self.orders.insert_order(&order).await?;

        info!("Created order {} for user {}", stored.id, stored.user_id);
        Ok(stored)
    }

    /// List all orders in insertion order
    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        let orders = self.orders.list_orders().await?;
        info!("Found {} orders", orders.len());
        Ok(orders)
    }

    /// Get an order by id; absence is not an error
    pub async fn get_order(&self, id: i64) -> Result<Option<Order>, DomainError> {
        let order = self.orders.get_order(id).await?;
        if order.is_none() {
            warn!("Order not found: {}", id);
        }
        Ok(order)
    }

    /// Update an existing order; only supplied fields change.
    /// A newly supplied user_id is checked before anything is written.
    pub async fn update_order(&self, request: UpdateOrderRequest) -> Result<Order, DomainError> {
        info!("Updating order: {}", request.id);

        let mut order = self
            .orders
            .get_order(request.id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "order",
                id: request.id,
            })?;

        if let Some(user_id) = request.user_id {
            if !self.users.user_exists(user_id).await? {
                return Err(DomainError::MissingReference {
                    entity: "user",
                    id: user_id,
                });
            }
            order.user_id = user_id;
        }
        if let Some(status) = request.status {
            order.status = status;
        }
        if let Some(total_amount) = request.total_amount {
            validate_non_negative_amount("total_amount", total_amount)?;
            order.total_amount = total_amount;
        }
        if let Some(notes) = request.notes {
            order.notes = Some(notes);
        }

        order.updated_at = Utc::now();
        self.orders.update_order(&order).await?;

        info!("Updated order {}", order.id);
        Ok(order)
    }

    /// Delete an order; missing rows are reported, not raised.
    /// Items belonging to the order are left untouched.
    pub async fn delete_order(&self, id: i64) -> Result<DeleteResponse, DomainError> {
        info!("Deleting order: {}", id);

        let removed = self.orders.delete_order(id).await?;
        if !removed {
            warn!("Nothing to delete, order not found: {}", id);
        }

        Ok(DeleteResponse { success: removed })
    }
}
