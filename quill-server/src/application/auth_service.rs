use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{SessionKeys, hash_password, verify_password};

#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Clone)]
pub struct AuthService<R: UserRepository + 'static> {
    repo: Arc<R>,
    keys: SessionKeys,
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, keys: SessionKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegistrationInput) -> Result<(User, String), DomainError> {
        let hash =
            hash_password(&input.password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let mut user = User::new(input.username, input.email.to_lowercase(), hash);
        user.first_name = input.first_name;
        user.last_name = input.last_name;
        self.repo.create(&user).await?;

        let token = self
            .keys
            .issue(&user)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        Ok((user, token))
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), DomainError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        let token = self
            .keys
            .issue(&user)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        Ok((user, token))
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: ProfileInput,
    ) -> Result<User, DomainError> {
        let mut user = self.get_user(user_id).await?;
        user.username = input.username;
        user.first_name = input.first_name;
        user.last_name = input.last_name;
        user.email = input.email.to_lowercase();

        if !self.repo.update_profile(&user).await? {
            return Err(DomainError::UserNotFound(user_id.to_string()));
        }
        Ok(user)
    }
}
