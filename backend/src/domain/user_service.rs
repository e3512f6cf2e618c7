use chrono::Utc;
use shared::{CreateUserRequest, DeleteResponse, UpdateUserRequest, User};
use tracing::{info, warn};

use crate::db::DbConnection;
use crate::domain::{validate_email, validate_name};
use crate::error::DomainError;
use crate::storage::user_repository::UserRepository;

/// Service for managing user accounts
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            users: UserRepository::new(db),
        }
    }

    /// Create a new user with defaults applied
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        info!("Creating user: name={}", request.name);

        let name = validate_name("name", &request.name)?;
        let email = validate_email(&request.email)?;

        let now = Utc::now();
        let user = User {
            id: 0, // assigned by storage
            name,
            email,
            role: request.role.unwrap_or_default(),
            is_active: request.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let stored = self.users.insert_user(&user).await?;

        info!("Created user {} with id {}", stored.name, stored.id);
        Ok(stored)
    }

    /// List all users in insertion order
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let users = self.users.list_users().await?;
        info!("Found {} users", users.len());
        Ok(users)
    }

    /// Get a user by id; absence is not an error
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        let user = self.users.get_user(id).await?;
        if user.is_none() {
            warn!("User not found: {}", id);
        }
        Ok(user)
    }

    /// Update an existing user; only supplied fields change
    pub async fn update_user(&self, request: UpdateUserRequest) -> Result<User, DomainError> {
        info!("Updating user: {}", request.id);

        let mut user = self
            .users
            .get_user(request.id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "user",
                id: request.id,
            })?;

        if let Some(name) = request.name {
            user.name = validate_name("name", &name)?;
        }
        if let Some(email) = request.email {
            user.email = validate_email(&email)?;
        }
        if let Some(role) = request.role {
            user.role = role;
        }
        if let Some(is_active) = request.is_active {
            user.is_active = is_active;
        }

        user.updated_at = Utc::now();
        self.users.update_user(&user).await?;

        info!("Updated user {} with id {}", user.name, user.id);
        Ok(user)
    }

    /// Delete a user; missing rows are reported, not raised
    pub async fn delete_user(&self, id: i64) -> Result<DeleteResponse, DomainError> {
        info!("Deleting user: {}", id);

        let removed = self.users.delete_user(id).await?;
        if !removed {
            warn!("Nothing to delete, user not found: {}", id);
        }

        Ok(DeleteResponse { success: removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::UserRole;

    async fn setup_test() -> UserService {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        UserService::new(db)
    }

    fn create_request(name: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            role: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_create_user_applies_defaults() {
        let service = setup_test().await;

        let user = service
            .create_user(create_request("  Alice ", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, UserRole::User);
        assert!(user.is_active);
        assert!(user.created_at <= user.updated_at);
    }

    #[tokio::test]
    async fn test_create_user_honors_explicit_fields() {
        let service = setup_test().await;

        let user = service
            .create_user(CreateUserRequest {
                name: "Root".to_string(),
                email: "root@example.com".to_string(),
                role: Some(UserRole::Admin),
                is_active: Some(false),
            })
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::Admin);
        assert!(!user.is_active);
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let service = setup_test().await;

        let result = service.create_user(create_request("  ", "alice@example.com")).await;
        assert!(matches!(result, Err(DomainError::Validation { field: "name", .. })));

        let result = service.create_user(create_request("Alice", "not-an-email")).await;
        assert!(matches!(result, Err(DomainError::Validation { field: "email", .. })));

        // Nothing was written
        assert!(service.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_user_absent_is_none() {
        let service = setup_test().await;
        let user = service.get_user(99999).await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_list_users_in_insertion_order() {
        let service = setup_test().await;

        service.create_user(create_request("Alice", "alice@example.com")).await.unwrap();
        service.create_user(create_request("Bob", "bob@example.com")).await.unwrap();

        let users = service.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "Alice");
        assert_eq!(users[1].name, "Bob");
        assert!(users[0].id < users[1].id);
    }

    #[tokio::test]
    async fn test_update_user_partial_fields() {
        let service = setup_test().await;

        let created = service
            .create_user(create_request("Alice", "alice@example.com"))
            .await
            .unwrap();

        let updated = service
            .update_user(UpdateUserRequest {
                id: created.id,
                name: None,
                email: Some("alice@corp.example.com".to_string()),
                role: None,
                is_active: None,
            })
            .await
            .unwrap();

        // Only the supplied field changed
        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.email, "alice@corp.example.com");
        assert_eq!(updated.role, created.role);
        assert_eq!(updated.is_active, created.is_active);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);

        // The change is persisted
        let reloaded = service.get_user(created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.email, "alice@corp.example.com");
    }

    #[tokio::test]
    async fn test_update_missing_user_raises_not_found() {
        let service = setup_test().await;

        let result = service
            .update_user(UpdateUserRequest {
                id: 4242,
                name: Some("Ghost".to_string()),
                email: None,
                role: None,
                is_active: None,
            })
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { entity: "user", id: 4242 })));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_supplied_field() {
        let service = setup_test().await;

        let created = service
            .create_user(create_request("Alice", "alice@example.com"))
            .await
            .unwrap();

        let result = service
            .update_user(UpdateUserRequest {
                id: created.id,
                name: None,
                email: Some("broken".to_string()),
                role: None,
                is_active: None,
            })
            .await;
        assert!(matches!(result, Err(DomainError::Validation { field: "email", .. })));

        // The stored row is untouched
        let reloaded = service.get_user(created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_delete_user_then_absent() {
        let service = setup_test().await;

        let created = service
            .create_user(create_request("Alice", "alice@example.com"))
            .await
            .unwrap();

        let response = service.delete_user(created.id).await.unwrap();
        assert!(response.success);

        assert!(service.get_user(created.id).await.unwrap().is_none());

        // Deleting again is a non-error with success false
        let response = service.delete_user(created.id).await.unwrap();
        assert!(!response.success);
    }
}
