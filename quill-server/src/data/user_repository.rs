use crate::domain::error::DomainError;
use crate::domain::user::User;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    /// Updates username, names and email; returns false when the id is gone.
    async fn update_profile(&self, user: &User) -> Result<bool, DomainError>;
}

const SELECT_USER: &str = r#"
    SELECT id, username, first_name, last_name, email, password_hash, created_at
    FROM users
"#;

fn duplicate_user_error(e: sqlx::Error) -> DomainError {
    let constraint = e
        .as_database_error()
        .and_then(|db| db.constraint())
        .unwrap_or("");
    if constraint.contains("users_username") {
        DomainError::UserAlreadyExists("username already taken".to_string())
    } else if constraint.contains("users_email") {
        DomainError::UserAlreadyExists("email already registered".to_string())
    } else {
        DomainError::Internal(format!("database error: {}", e))
    }
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, bind: &str) -> Result<Option<User>, DomainError> {
        let sql = format!("{SELECT_USER} {clause}");
        sqlx::query_as::<_, User>(&sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error finding user: {}", e);
                DomainError::Internal(format!("database error: {}", e))
            })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, first_name, last_name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create user: {}", e);
            duplicate_user_error(e)
        })?;

        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let sql = format!("{SELECT_USER} WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_by_id {}: {}", id, e);
                DomainError::Internal(format!("database error: {}", e))
            })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("WHERE username = $1", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("WHERE email = $1", email).await
    }

    async fn update_profile(&self, user: &User) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $1, first_name = $2, last_name = $3, email = $4
            WHERE id = $5
            "#,
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update profile {}: {}", user.id, e);
            duplicate_user_error(e)
        })?;

        if result.rows_affected() > 0 {
            info!(user_id = %user.id, "profile updated");
        }
        Ok(result.rows_affected() > 0)
    }
}
