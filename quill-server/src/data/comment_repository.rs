use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::user::Author;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, DomainError>;
    /// Comments of a post in creation order, authors attached.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError>;
    async fn update(&self, comment: &Comment) -> Result<bool, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            text: row.text,
            created_at: row.created_at,
            author: Author {
                id: row.author_id,
                username: row.author_username,
            },
        }
    }
}

const SELECT_COMMENT: &str = r#"
    SELECT cm.id, cm.post_id, cm.text, cm.created_at,
           u.id AS author_id, u.username AS author_username
    FROM comments cm
    JOIN users u ON u.id = cm.author_id
"#;

#[derive(Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, author_id, text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author.id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create comment: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, DomainError> {
        let sql = format!("{SELECT_COMMENT} WHERE cm.id = $1");
        sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Comment::from))
            .map_err(|e| {
                error!("db error find_by_id {}: {}", id, e);
                DomainError::Internal(e.to_string())
            })
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let sql = format!("{SELECT_COMMENT} WHERE cm.post_id = $1 ORDER BY cm.created_at ASC");
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error listing comments for post {}: {}", post_id, e);
                DomainError::Internal(e.to_string())
            })?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn update(&self, comment: &Comment) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE comments SET text = $1 WHERE id = $2")
            .bind(&comment.text)
            .bind(comment.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to update comment {}: {}", comment.id, e);
                DomainError::Internal(e.to_string())
            })?;

        if result.rows_affected() > 0 {
            info!(comment_id = %comment.id, "comment updated");
        }
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if result.rows_affected() > 0 {
            info!(comment_id = %id, "comment deleted");
        }
        Ok(result.rows_affected() > 0)
    }
}
