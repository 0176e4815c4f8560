use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::policy::{self, Gate};
use crate::domain::post::Post;
use crate::domain::user::Author;

#[derive(Clone)]
pub struct CommentService<C, P>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    comments: Arc<C>,
    posts: Arc<P>,
}

impl<C, P> CommentService<C, P>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    pub fn new(comments: Arc<C>, posts: Arc<P>) -> Self {
        Self { comments, posts }
    }

    /// The comment by id, checked against the post id from the URL so a
    /// comment cannot be addressed through another post's path.
    pub async fn get(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .filter(|comment| comment.post_id == post_id)
            .ok_or(DomainError::CommentNotFound(comment_id))
    }

    /// The target post with the viewer's visibility applied; a hidden post
    /// reads as absent.
    pub async fn visible_post(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        if !policy::is_visible(&post, viewer, now) {
            return Err(DomainError::PostNotFound(post_id));
        }
        Ok(post)
    }

    #[instrument(skip(self, text))]
    pub async fn create(
        &self,
        author: Author,
        post_id: Uuid,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<Comment, DomainError> {
        let post = self.visible_post(post_id, Some(author.id), now).await?;

        let comment = Comment::new(author, post.id, text);
        self.comments.create(&comment).await?;
        Ok(comment)
    }

    #[instrument(skip(self, text))]
    pub async fn update(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        viewer_id: Uuid,
        text: String,
    ) -> Result<Comment, DomainError> {
        let mut comment = self.get(post_id, comment_id).await?;
        if let Gate::Deny(post) = policy::ownership_gate(comment.author.id, viewer_id, post_id) {
            return Err(DomainError::NotOwner { post });
        }

        comment.text = text;
        if !self.comments.update(&comment).await? {
            return Err(DomainError::CommentNotFound(comment_id));
        }
        Ok(comment)
    }

    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<(), DomainError> {
        let comment = self.get(post_id, comment_id).await?;
        if let Gate::Deny(post) = policy::ownership_gate(comment.author.id, viewer_id, post_id) {
            return Err(DomainError::NotOwner { post });
        }

        if !self.comments.delete(comment.id).await? {
            return Err(DomainError::CommentNotFound(comment_id));
        }
        Ok(())
    }
}
