use crate::domain::category::Category;
use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, DomainError>;
    async fn list_published(&self) -> Result<Vec<Category>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_CATEGORY: &str = r#"
    SELECT id, title, description, slug, is_published, created_at
    FROM categories
"#;

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let sql = format!("{SELECT_CATEGORY} WHERE slug = $1");
        sqlx::query_as::<_, Category>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_by_slug {}: {}", slug, e);
                DomainError::Internal(e.to_string())
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        let sql = format!("{SELECT_CATEGORY} WHERE id = $1");
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_by_id {}: {}", id, e);
                DomainError::Internal(e.to_string())
            })
    }

    async fn list_published(&self) -> Result<Vec<Category>, DomainError> {
        let sql = format!("{SELECT_CATEGORY} WHERE is_published = TRUE ORDER BY title ASC");
        sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error listing categories: {}", e);
                DomainError::Internal(e.to_string())
            })
    }
}
