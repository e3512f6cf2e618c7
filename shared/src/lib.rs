use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role assigned to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

impl UserRole {
    /// Textual form used in the storage layer
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Guest => "guest",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            "guest" => Ok(UserRole::Guest),
            other => Err(format!("unknown user role: {}", other)),
        }
    }
}

/// Fulfillment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Textual form used in the storage layer
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Unit price; persisted as text in storage but always numeric on the wire
    pub price: f64,
    pub stock_quantity: i64,
    /// Category this product belongs to, if any
    pub category_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// User who placed the order
    pub user_id: i64,
    pub status: OrderStatus,
    /// Order total; persisted as text in storage but always numeric on the wire
    pub total_amount: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Price per unit at the time the line was added
    pub unit_price: f64,
    /// Line total; persisted as text in storage but always numeric on the wire
    pub subtotal: f64,
    pub created_at: DateTime<Utc>,
}

/// Input for users.create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    /// Defaults to `user` when omitted
    pub role: Option<UserRole>,
    /// Defaults to true when omitted
    pub is_active: Option<bool>,
}

/// Input for users.update; only supplied fields change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Input for categories.create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to true when omitted
    pub is_active: Option<bool>,
}

/// Input for categories.update; only supplied fields change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for products.create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Defaults to 0 when omitted
    pub stock_quantity: Option<i64>,
    pub category_id: Option<i64>,
    /// Defaults to true when omitted
    pub is_active: Option<bool>,
}

/// Input for products.update; only supplied fields change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub category_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// Input for orders.create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    /// Defaults to `pending` when omitted
    pub status: Option<OrderStatus>,
    pub total_amount: f64,
    pub notes: Option<String>,
}

/// Input for orders.update; only supplied fields change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    pub id: i64,
    pub user_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub total_amount: Option<f64>,
    pub notes: Option<String>,
}

/// Input for orderItems.create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderItemRequest {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Input for orderItems.update; only supplied fields change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOrderItemRequest {
    pub id: i64,
    pub order_id: Option<i64>,
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub subtotal: Option<f64>,
}

/// Input for getById, delete and getByOrderId operations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdRequest {
    pub id: i64,
}

/// Result of a delete operation; false means there was nothing to delete
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Result of the healthcheck operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthcheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
