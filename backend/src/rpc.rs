use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use shared::{
    CreateCategoryRequest, CreateOrderItemRequest, CreateOrderRequest, CreateProductRequest,
    CreateUserRequest, HealthcheckResponse, IdRequest, UpdateCategoryRequest,
    UpdateOrderItemRequest, UpdateOrderRequest, UpdateProductRequest, UpdateUserRequest,
};

use crate::db::DbConnection;
use crate::domain::category_service::CategoryService;
use crate::domain::order_item_service::OrderItemService;
use crate::domain::order_service::OrderService;
use crate::domain::product_service::ProductService;
use crate::domain::user_service::UserService;
use crate::error::DomainError;

/// Application state: one service per entity, all sharing the storage client
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub categories: CategoryService,
    pub products: ProductService,
    pub orders: OrderService,
    pub order_items: OrderItemService,
}

impl AppState {
    pub fn new(db: DbConnection) -> Self {
        Self {
            users: UserService::new(db.clone()),
            categories: CategoryService::new(db.clone()),
            products: ProductService::new(db.clone()),
            orders: OrderService::new(db.clone()),
            order_items: OrderItemService::new(db),
        }
    }
}

/// Build the RPC router. Every operation travels through one endpoint,
/// addressed by its namespaced name (`users.create`, `orderItems.getByOrderId`, ...).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/rpc/:operation", post(handle_rpc))
        .with_state(state)
}

/// Axum handler carrying all operations
async fn handle_rpc(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    body: Bytes,
) -> Response {
    info!("POST /api/rpc/{}", operation);

    // An empty body stands for "no input" (getAll, healthcheck)
    let input = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => {
                return error_response(
                    &operation,
                    RpcError::Decode(format!("malformed JSON body: {}", e)),
                )
            }
        }
    };

    match dispatch(&state, &operation, input).await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => error_response(&operation, e),
    }
}

enum RpcError {
    UnknownOperation(String),
    Decode(String),
    Domain(DomainError),
    Internal(String),
}

impl From<DomainError> for RpcError {
    fn from(e: DomainError) -> Self {
        RpcError::Domain(e)
    }
}

fn decode<T: DeserializeOwned>(operation: &str, input: Value) -> Result<T, RpcError> {
    serde_json::from_value(input)
        .map_err(|e| RpcError::Decode(format!("invalid input for {}: {}", operation, e)))
}

fn encode<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value)
        .map_err(|e| RpcError::Internal(format!("failed to serialize response: {}", e)))
}

/// Route an operation name to its handler
async fn dispatch(state: &AppState, operation: &str, input: Value) -> Result<Value, RpcError> {
    match operation {
        "healthcheck" => encode(&HealthcheckResponse {
            status: "ok".to_string(),
            timestamp: Utc::now(),
        }),

        "users.create" => {
            let request: CreateUserRequest = decode(operation, input)?;
            encode(&state.users.create_user(request).await?)
        }
        "users.getAll" => encode(&state.users.list_users().await?),
        "users.getById" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.users.get_user(id).await?)
        }
        "users.update" => {
            let request: UpdateUserRequest = decode(operation, input)?;
            encode(&state.users.update_user(request).await?)
        }
        "users.delete" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.users.delete_user(id).await?)
        }

        "categories.create" => {
            let request: CreateCategoryRequest = decode(operation, input)?;
            encode(&state.categories.create_category(request).await?)
        }
        "categories.getAll" => encode(&state.categories.list_categories().await?),
        "categories.getById" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.categories.get_category(id).await?)
        }
        "categories.update" => {
            let request: UpdateCategoryRequest = decode(operation, input)?;
            encode(&state.categories.update_category(request).await?)
        }
        "categories.delete" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.categories.delete_category(id).await?)
        }

        "products.create" => {
            let request: CreateProductRequest = decode(operation, input)?;
            encode(&state.products.create_product(request).await?)
        }
        "products.getAll" => encode(&state.products.list_products().await?),
        "products.getById" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.products.get_product(id).await?)
        }
        "products.update" => {
            let request: UpdateProductRequest = decode(operation, input)?;
            encode(&state.products.update_product(request).await?)
        }
        "products.delete" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.products.delete_product(id).await?)
        }

        "orders.create" => {
            let request: CreateOrderRequest = decode(operation, input)?;
            encode(&state.orders.create_order(request).await?)
        }
        "orders.getAll" => encode(&state.orders.list_orders().await?),
        "orders.getById" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.orders.get_order(id).await?)
        }
        "orders.update" => {
            let request: UpdateOrderRequest = decode(operation, input)?;
            encode(&state.orders.update_order(request).await?)
        }
        "orders.delete" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.orders.delete_order(id).await?)
        }

        "orderItems.create" => {
            let request: CreateOrderItemRequest = decode(operation, input)?;
            encode(&state.order_items.create_order_item(request).await?)
        }
        "orderItems.getAll" => encode(&state.order_items.list_order_items().await?),
        "orderItems.getById" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.order_items.get_order_item(id).await?)
        }
        "orderItems.getByOrderId" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.order_items.get_order_items_by_order(id).await?)
        }
        "orderItems.update" => {
            let request: UpdateOrderItemRequest = decode(operation, input)?;
            encode(&state.order_items.update_order_item(request).await?)
        }
        "orderItems.delete" => {
            let IdRequest { id } = decode(operation, input)?;
            encode(&state.order_items.delete_order_item(id).await?)
        }

        unknown => Err(RpcError::UnknownOperation(unknown.to_string())),
    }
}

/// Map the error taxonomy onto HTTP statuses
fn error_response(operation: &str, err: RpcError) -> Response {
    match err {
        RpcError::UnknownOperation(op) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown operation: {}", op) })),
        )
            .into_response(),
        RpcError::Decode(message) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
        RpcError::Domain(e) => match &e {
            DomainError::Validation { .. } | DomainError::MissingReference { .. } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            DomainError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            DomainError::Storage(_) => {
                error!("Storage failure handling {}: {:?}", operation, e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal storage error" })),
                )
                    .into_response()
            }
        },
        RpcError::Internal(message) => {
            error!("Internal failure handling {}: {}", operation, message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal error" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn setup_app() -> Router {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        router(AppState::new(db))
    }

    /// Call one RPC operation and decode the JSON response
    async fn rpc(app: &Router, operation: &str, input: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/rpc/{}", operation))
            .header("content-type", "application/json")
            .body(Body::from(input.to_string()))
            .expect("Failed to build request");

        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("Router call failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response body should be JSON")
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let app = setup_app().await;

        let (status, body) = rpc(&app, "healthcheck", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_operation_is_not_found() {
        let app = setup_app().await;

        let (status, body) = rpc(&app, "users.frobnicate", Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("unknown operation"));
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_bad_request() {
        let app = setup_app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/rpc/users.create")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_create_and_get_by_id() {
        let app = setup_app().await;

        let (status, user) = rpc(
            &app,
            "users.create",
            json!({ "name": "Alice", "email": "alice@example.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["id"], 1);
        assert_eq!(user["role"], "user");
        assert_eq!(user["is_active"], true);
        assert!(user["created_at"].is_string());

        let (status, fetched) = rpc(&app, "users.getById", json!({ "id": 1 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["email"], "alice@example.com");

        // Absent id comes back as null, not an error
        let (status, missing) = rpc(&app, "users.getById", json!({ "id": 999 })).await;
        assert_eq!(status, StatusCode::OK);
        assert!(missing.is_null());
    }

    #[tokio::test]
    async fn test_schema_rejects_unknown_enum_value() {
        let app = setup_app().await;

        let (status, body) = rpc(
            &app,
            "users.create",
            json!({ "name": "Eve", "email": "eve@example.com", "role": "superuser" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("users.create"));
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request() {
        let app = setup_app().await;

        let (status, body) = rpc(
            &app,
            "users.create",
            json!({ "name": "", "email": "alice@example.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn test_update_missing_target_is_not_found() {
        let app = setup_app().await;

        let (status, body) = rpc(
            &app,
            "products.update",
            json!({ "id": 4242, "price": 1.0 }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("4242"));
    }

    #[tokio::test]
    async fn test_order_with_dangling_user_is_rejected() {
        let app = setup_app().await;

        let (status, body) = rpc(
            &app,
            "orders.create",
            json!({ "user_id": 99999, "total_amount": 10.0 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("99999"));

        let (_, orders) = rpc(&app, "orders.getAll", Value::Null).await;
        assert_eq!(orders.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_delete_reports_success_flag() {
        let app = setup_app().await;

        rpc(
            &app,
            "categories.create",
            json!({ "name": "Transient" }),
        )
        .await;

        let (status, body) = rpc(&app, "categories.delete", json!({ "id": 1 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = rpc(&app, "categories.delete", json!({ "id": 1 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_category_product_scenario() {
        let app = setup_app().await;

        let (_, category) = rpc(&app, "categories.create", json!({ "name": "Books" })).await;
        let category_id = category["id"].as_i64().unwrap();

        let (status, _) = rpc(
            &app,
            "products.create",
            json!({ "name": "Novel", "price": 9.99, "category_id": category_id }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, products) = rpc(&app, "products.getAll", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        let products = products.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], "Novel");
        assert_eq!(products[0]["category_id"], category_id);
        // Price is a JSON number, not a string, despite textual storage
        assert!(products[0]["price"].is_number());
        assert_eq!(products[0]["price"], json!(9.99));
    }

    #[tokio::test]
    async fn test_order_items_flow_over_rpc() {
        let app = setup_app().await;

        let (_, user) = rpc(
            &app,
            "users.create",
            json!({ "name": "Alice", "email": "alice@example.com" }),
        )
        .await;
        let (_, order) = rpc(
            &app,
            "orders.create",
            json!({ "user_id": user["id"], "total_amount": 20.0 }),
        )
        .await;
        let (_, product) = rpc(
            &app,
            "products.create",
            json!({ "name": "Novel", "price": 10.0 }),
        )
        .await;

        // A line referencing a missing order fails and writes nothing
        let (status, _) = rpc(
            &app,
            "orderItems.create",
            json!({
                "order_id": 99999,
                "product_id": product["id"],
                "quantity": 2,
                "unit_price": 10.0,
                "subtotal": 20.0
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, items) = rpc(&app, "orderItems.getAll", Value::Null).await;
        assert_eq!(items.as_array().unwrap().len(), 0);

        let (status, item) = rpc(
            &app,
            "orderItems.create",
            json!({
                "order_id": order["id"],
                "product_id": product["id"],
                "quantity": 2,
                "unit_price": 10.0,
                "subtotal": 20.0
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, items) = rpc(
            &app,
            "orderItems.getByOrderId",
            json!({ "id": order["id"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let items = items.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], item["id"]);
        assert!(items[0]["unit_price"].is_number());
    }
}
