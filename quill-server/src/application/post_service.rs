use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::data::category_repository::CategoryRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::policy::{self, Gate};
use crate::domain::post::Post;
use crate::domain::user::Author;

/// Validated post fields, produced by the form layer.
#[derive(Debug, Clone)]
pub struct PostInput {
    pub title: String,
    pub text: String,
    pub category_id: Uuid,
    pub pub_date: Option<DateTime<Utc>>,
    /// `None` means "published" on create and "keep the current flag" on
    /// update.
    pub is_published: Option<bool>,
}

#[derive(Clone)]
pub struct PostService<P, G>
where
    P: PostRepository + 'static,
    G: CategoryRepository + 'static,
{
    posts: Arc<P>,
    categories: Arc<G>,
}

impl<P, G> PostService<P, G>
where
    P: PostRepository + 'static,
    G: CategoryRepository + 'static,
{
    pub fn new(posts: Arc<P>, categories: Arc<G>) -> Self {
        Self { posts, categories }
    }

    /// The raw post by id, visibility not applied. Mutation surfaces resolve
    /// existence first and ownership second.
    pub async fn get(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        author: Author,
        input: PostInput,
        now: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        let category = self
            .categories
            .find_by_id(input.category_id)
            .await?
            .ok_or_else(|| DomainError::CategoryNotFound(input.category_id.to_string()))?;

        let post = Post::new(
            author,
            (&category).into(),
            input.title,
            input.text,
            input.pub_date.unwrap_or(now),
            input.is_published.unwrap_or(true),
        );
        self.posts.create(&post).await?;
        Ok(post)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        post_id: Uuid,
        viewer_id: Uuid,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        let mut post = self.get(post_id).await?;
        if let Gate::Deny(post) = policy::ownership_gate(post.author.id, viewer_id, post.id) {
            return Err(DomainError::NotOwner { post });
        }

        let category = self
            .categories
            .find_by_id(input.category_id)
            .await?
            .ok_or_else(|| DomainError::CategoryNotFound(input.category_id.to_string()))?;

        // The author is never re-stamped on update.
        post.title = input.title;
        post.text = input.text;
        post.category = (&category).into();
        if let Some(pub_date) = input.pub_date {
            post.pub_date = pub_date;
        }
        if let Some(is_published) = input.is_published {
            post.is_published = is_published;
        }

        if !self.posts.update(&post).await? {
            return Err(DomainError::PostNotFound(post_id));
        }
        Ok(post)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, post_id: Uuid, viewer_id: Uuid) -> Result<(), DomainError> {
        let post = self.get(post_id).await?;
        if let Gate::Deny(post) = policy::ownership_gate(post.author.id, viewer_id, post.id) {
            return Err(DomainError::NotOwner { post });
        }

        if !self.posts.delete(post.id).await? {
            return Err(DomainError::PostNotFound(post_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::*;

    fn service(store: &Store) -> PostService<MemPosts, MemCategories> {
        PostService::new(store.posts.clone(), store.categories.clone())
    }

    fn input(category_id: Uuid, title: &str) -> PostInput {
        PostInput {
            title: title.to_string(),
            text: "body".to_string(),
            category_id,
            pub_date: None,
            is_published: None,
        }
    }

    #[tokio::test]
    async fn create_stamps_the_viewer_as_author() {
        let store = Store::new();
        let user = store.add_user("alice");
        let category = store.add_category("travel", true);

        let post = service(&store)
            .create(
                Author::from(&user),
                input(category.id, "hello"),
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(post.author.id, user.id);
        assert_eq!(store.get_post(post.id).unwrap().title, "hello");
    }

    #[tokio::test]
    async fn create_honors_the_draft_flag() {
        let store = Store::new();
        let user = store.add_user("alice");
        let category = store.add_category("travel", true);

        let mut draft = input(category.id, "secret");
        draft.is_published = Some(false);
        let post = service(&store)
            .create(Author::from(&user), draft, Utc::now())
            .await
            .unwrap();

        assert!(!post.is_published);
        assert!(!store.get_post(post.id).unwrap().is_published);
    }

    #[tokio::test]
    async fn update_toggles_and_keeps_the_publish_flag() {
        let store = Store::new();
        let owner = store.add_user("alice");
        let category = store.add_category("travel", true);
        let post = store.add_post(&owner, &category, true, Utc::now());

        let service = service(&store);
        let mut withdraw = input(category.id, "hidden again");
        withdraw.is_published = Some(false);
        let updated = service.update(post.id, owner.id, withdraw).await.unwrap();
        assert!(!updated.is_published);

        // Absent flag keeps whatever is stored.
        let kept = service
            .update(post.id, owner.id, input(category.id, "still hidden"))
            .await
            .unwrap();
        assert!(!kept.is_published);
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let store = Store::new();
        let user = store.add_user("alice");

        let result = service(&store)
            .create(Author::from(&user), input(Uuid::new_v4(), "hello"), Utc::now())
            .await;
        assert!(matches!(result, Err(DomainError::CategoryNotFound(_))));
    }

    #[tokio::test]
    async fn non_owner_update_is_denied_and_changes_nothing() {
        let store = Store::new();
        let owner = store.add_user("alice");
        let intruder = store.add_user("mallory");
        let category = store.add_category("travel", true);
        let post = store.add_post(&owner, &category, true, Utc::now());

        let before = store.get_post(post.id).unwrap();
        let result = service(&store)
            .update(post.id, intruder.id, input(category.id, "defaced"))
            .await;

        assert!(matches!(result, Err(DomainError::NotOwner { post: id }) if id == post.id));
        let after = store.get_post(post.id).unwrap();
        assert_eq!(before.title, after.title);
        assert_eq!(before.text, after.text);
        assert_eq!(before.pub_date, after.pub_date);
    }

    #[tokio::test]
    async fn non_owner_delete_is_denied() {
        let store = Store::new();
        let owner = store.add_user("alice");
        let intruder = store.add_user("mallory");
        let category = store.add_category("travel", true);
        let post = store.add_post(&owner, &category, true, Utc::now());

        let result = service(&store).delete(post.id, intruder.id).await;
        assert!(matches!(result, Err(DomainError::NotOwner { .. })));
        assert!(store.get_post(post.id).is_some());
    }

    #[tokio::test]
    async fn owner_updates_and_deletes() {
        let store = Store::new();
        let owner = store.add_user("alice");
        let category = store.add_category("travel", true);
        let post = store.add_post(&owner, &category, true, Utc::now());

        let service = service(&store);
        let updated = service
            .update(post.id, owner.id, input(category.id, "revised"))
            .await
            .unwrap();
        assert_eq!(updated.title, "revised");
        assert_eq!(updated.author.id, owner.id);

        service.delete(post.id, owner.id).await.unwrap();
        assert!(store.get_post(post.id).is_none());
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let store = Store::new();
        let user = store.add_user("alice");
        let result = service(&store).delete(Uuid::new_v4(), user.id).await;
        assert!(matches!(result, Err(DomainError::PostNotFound(_))));
    }
}
