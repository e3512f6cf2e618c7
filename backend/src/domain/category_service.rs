use chrono::Utc;
use shared::{Category, CreateCategoryRequest, DeleteResponse, UpdateCategoryRequest};
use tracing::{info, warn};

use crate::db::DbConnection;
use crate::domain::validate_name;
use crate::error::DomainError;
use crate::storage::category_repository::CategoryRepository;

/// Service for managing product categories
#[derive(Clone)]
pub struct CategoryService {
    categories: CategoryRepository,
}

impl CategoryService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            categories: CategoryRepository::new(db),
        }
    }

    /// Create a new category with defaults applied
    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<Category, DomainError> {
        info!("Creating category: name={}", request.name);

        let name = validate_name("name", &request.name)?;

        let now = Utc::now();
        let category = Category {
            id: 0, // assigned by storage
            name,
            description: request.description,
            is_active: request.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let stored = self.categories.insert_category(&category).await?;

        info!("Created category {} with id {}", stored.name, stored.id);
        Ok(stored)
    }

    /// List all categories in insertion order
    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let categories = self.categories.list_categories().await?;
        info!("Found {} categories", categories.len());
        Ok(categories)
    }

    /// Get a category by id; absence is not an error
    pub async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        let category = self.categories.get_category(id).await?;
        if category.is_none() {
            warn!("Category not found: {}", id);
        }
        Ok(category)
    }

    /// Update an existing category; only supplied fields change
    pub async fn update_category(
        &self,
        request: UpdateCategoryRequest,
    ) -> Result<Category, DomainError> {
        info!("Updating category: {}", request.id);

        let mut category = self
            .categories
            .get_category(request.id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "category",
                id: request.id,
            })?;

        if let Some(name) = request.name {
            category.name = validate_name("name", &name)?;
        }
        if let Some(description) = request.description {
            category.description = Some(description);
        }
        if let Some(is_active) = request.is_active {
            category.is_active = is_active;
        }

        category.updated_at = Utc::now();
        self.categories.update_category(&category).await?;

        info!("Updated category {} with id {}", category.name, category.id);
        Ok(category)
    }

    /// Delete a category; missing rows are reported, not raised.
    /// Products referencing the category are left untouched.
    pub async fn delete_category(&self, id: i64) -> Result<DeleteResponse, DomainError> {
        info!("Deleting category: {}", id);

        let removed = self.categories.delete_category(id).await?;
        if !removed {
            warn!("Nothing to delete, category not found: {}", id);
        }

        Ok(DeleteResponse { success: removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> CategoryService {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        CategoryService::new(db)
    }

    #[tokio::test]
    async fn test_create_category_applies_defaults() {
        let service = setup_test().await;

        let category = service
            .create_category(CreateCategoryRequest {
                name: "Books".to_string(),
                description: None,
                is_active: None,
            })
            .await
            .unwrap();

        assert_eq!(category.id, 1);
        assert_eq!(category.name, "Books");
        assert!(category.description.is_none());
        assert!(category.is_active);
        assert!(category.created_at <= category.updated_at);
    }

    #[tokio::test]
    async fn test_create_category_with_description() {
        let service = setup_test().await;

        let category = service
            .create_category(CreateCategoryRequest {
                name: "Games".to_string(),
                description: Some("Board and video games".to_string()),
                is_active: Some(false),
            })
            .await
            .unwrap();

        assert_eq!(category.description.as_deref(), Some("Board and video games"));
        assert!(!category.is_active);
    }

    #[tokio::test]
    async fn test_create_category_rejects_empty_name() {
        let service = setup_test().await;

        let result = service
            .create_category(CreateCategoryRequest {
                name: "   ".to_string(),
                description: None,
                is_active: None,
            })
            .await;

        assert!(matches!(result, Err(DomainError::Validation { field: "name", .. })));
        assert!(service.list_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_category_partial_fields() {
        let service = setup_test().await;

        let created = service
            .create_category(CreateCategoryRequest {
                name: "Books".to_string(),
                description: None,
                is_active: None,
            })
            .await
            .unwrap();

        let updated = service
            .update_category(UpdateCategoryRequest {
                id: created.id,
                name: None,
                description: Some("Printed matter".to_string()),
                is_active: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "Books");
        assert_eq!(updated.description.as_deref(), Some("Printed matter"));
        assert!(updated.is_active);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_category_raises_not_found() {
        let service = setup_test().await;

        let result = service
            .update_category(UpdateCategoryRequest {
                id: 31337,
                name: Some("Ghost".to_string()),
                description: None,
                is_active: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "category", id: 31337 })
        ));
    }

    #[tokio::test]
    async fn test_delete_category_then_absent() {
        let service = setup_test().await;

        let created = service
            .create_category(CreateCategoryRequest {
                name: "Transient".to_string(),
                description: None,
                is_active: None,
            })
            .await
            .unwrap();

        assert!(service.delete_category(created.id).await.unwrap().success);
        assert!(service.get_category(created.id).await.unwrap().is_none());
        assert!(!service.delete_category(created.id).await.unwrap().success);
    }
}
