use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;
use uuid::Uuid;

use crate::presentation::render;
use crate::presentation::routes::Route;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("post not found: {0}")]
    PostNotFound(Uuid),
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("comment not found: {0}")]
    CommentNotFound(Uuid),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    /// Ownership denial. Never an error page; renders as a redirect to the
    /// post's detail view with the mutation left unapplied.
    #[error("not the author of post {post}")]
    NotOwner { post: Uuid },
    #[error("invalid credentials")]
    Unauthorized,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::PostNotFound(_)
            | DomainError::CategoryNotFound(_)
            | DomainError::UserNotFound(_)
            | DomainError::CommentNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::NotOwner { .. } => StatusCode::SEE_OTHER,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            DomainError::PostNotFound(_)
            | DomainError::CategoryNotFound(_)
            | DomainError::UserNotFound(_)
            | DomainError::CommentNotFound(_) => render::not_found(),
            DomainError::NotOwner { post } => render::see_other(&Route::PostDetail(*post).path()),
            DomainError::Unauthorized => render::unauthorized(),
            DomainError::UserAlreadyExists(message) => render::conflict(message),
            DomainError::Internal(_) => render::internal_error(),
        }
    }
}
