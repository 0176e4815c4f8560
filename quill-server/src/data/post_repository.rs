use crate::domain::category::CategoryRef;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::Author;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &Post) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    /// Every post, newest publication date first. Visibility is applied by the
    /// caller so the policy lives in one place.
    async fn list_recent(&self) -> Result<Vec<Post>, DomainError>;
    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, DomainError>;
    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError>;
    /// Returns false when no row matched the post id.
    async fn update(&self, post: &Post) -> Result<bool, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

/// Flat row shape produced by the three-way join; posts always come back with
/// their author and category attached.
#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    is_published: bool,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
    category_id: Uuid,
    category_title: String,
    category_slug: String,
    category_is_published: bool,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            title: row.title,
            text: row.text,
            pub_date: row.pub_date,
            is_published: row.is_published,
            created_at: row.created_at,
            author: Author {
                id: row.author_id,
                username: row.author_username,
            },
            category: CategoryRef {
                id: row.category_id,
                title: row.category_title,
                slug: row.category_slug,
                is_published: row.category_is_published,
            },
        }
    }
}

const SELECT_POST: &str = r#"
    SELECT p.id, p.title, p.text, p.pub_date, p.is_published, p.created_at,
           u.id AS author_id, u.username AS author_username,
           c.id AS category_id, c.title AS category_title,
           c.slug AS category_slug, c.is_published AS category_is_published
    FROM posts p
    JOIN users u ON u.id = p.author_id
    JOIN categories c ON c.id = p.category_id
"#;

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, clause: &str, bind: Option<Uuid>) -> Result<Vec<Post>, DomainError> {
        let sql = format!("{SELECT_POST} {clause} ORDER BY p.pub_date DESC");
        let mut query = sqlx::query_as::<_, PostRow>(&sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            error!("db error listing posts: {}", e);
            DomainError::Internal(e.to_string())
        })?;
        Ok(rows.into_iter().map(Post::from).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: &Post) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, category_id, title, text, pub_date, is_published, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(post.id)
        .bind(post.author.id)
        .bind(post.category.id)
        .bind(&post.title)
        .bind(&post.text)
        .bind(post.pub_date)
        .bind(post.is_published)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        info!(post_id = %post.id, author_id = %post.author.id, "post created");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let sql = format!("{SELECT_POST} WHERE p.id = $1");
        sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Post::from))
            .map_err(|e| {
                error!("db error find_by_id {}: {}", id, e);
                DomainError::Internal(e.to_string())
            })
    }

    async fn list_recent(&self) -> Result<Vec<Post>, DomainError> {
        self.fetch_where("", None).await
    }

    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, DomainError> {
        self.fetch_where("WHERE p.category_id = $1", Some(category_id))
            .await
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError> {
        self.fetch_where("WHERE p.author_id = $1", Some(author_id))
            .await
    }

    async fn update(&self, post: &Post) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, text = $2, category_id = $3, pub_date = $4, is_published = $5
            WHERE id = $6
            "#,
        )
        .bind(&post.title)
        .bind(&post.text)
        .bind(post.category.id)
        .bind(post.pub_date)
        .bind(post.is_published)
        .bind(post.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", post.id, e);
            DomainError::Internal(e.to_string())
        })?;

        if result.rows_affected() > 0 {
            info!(post_id = %post.id, "post updated");
        }
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if result.rows_affected() > 0 {
            info!(post_id = %id, "post deleted");
        }
        Ok(result.rows_affected() > 0)
    }
}
