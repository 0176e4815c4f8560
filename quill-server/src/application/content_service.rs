use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::pagination::{self, PAGE_SIZE, Page};
use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::policy;
use crate::domain::post::Post;
use crate::domain::user::User;

/// Number of posts on the legacy non-paginated feed.
const LATEST_FEED_SIZE: usize = 5;

/// Read side of the blog: every public listing surface composes the visibility
/// policy with a repository query. `viewer` and `now` always arrive as
/// arguments so the same call is reproducible in tests.
#[derive(Clone)]
pub struct ContentService<P, C, G, U>
where
    P: PostRepository + 'static,
    C: CommentRepository + 'static,
    G: CategoryRepository + 'static,
    U: UserRepository + 'static,
{
    posts: Arc<P>,
    comments: Arc<C>,
    categories: Arc<G>,
    users: Arc<U>,
}

impl<P, C, G, U> ContentService<P, C, G, U>
where
    P: PostRepository + 'static,
    C: CommentRepository + 'static,
    G: CategoryRepository + 'static,
    U: UserRepository + 'static,
{
    pub fn new(posts: Arc<P>, comments: Arc<C>, categories: Arc<G>, users: Arc<U>) -> Self {
        Self {
            posts,
            comments,
            categories,
            users,
        }
    }

    /// The five newest live posts, for the front-page feed.
    pub async fn latest(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.list_recent().await?;
        Ok(posts
            .into_iter()
            .filter(|post| policy::is_live(post, now))
            .take(LATEST_FEED_SIZE)
            .collect())
    }

    /// Live posts newest-first, paginated by ten.
    pub async fn index(&self, page: usize, now: DateTime<Utc>) -> Result<Page<Post>, DomainError> {
        let posts = self.posts.list_recent().await?;
        let live: Vec<Post> = posts
            .into_iter()
            .filter(|post| policy::is_live(post, now))
            .collect();
        Ok(pagination::paginate(live, PAGE_SIZE, page))
    }

    /// Live posts of one published category. An unknown slug and an
    /// unpublished category are both not-found.
    pub async fn category(
        &self,
        slug: &str,
        page: usize,
        now: DateTime<Utc>,
    ) -> Result<(Category, Page<Post>), DomainError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| DomainError::CategoryNotFound(slug.to_string()))?;

        let posts = self.posts.list_by_category(category.id).await?;
        let live: Vec<Post> = posts
            .into_iter()
            .filter(|post| policy::is_live(post, now))
            .collect();
        Ok((category, pagination::paginate(live, PAGE_SIZE, page)))
    }

    /// Everything the page owner ever wrote, drafts and scheduled posts
    /// included, newest publication date first.
    pub async fn profile(
        &self,
        username: &str,
        page: usize,
    ) -> Result<(User, Page<Post>), DomainError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))?;

        let posts = self.posts.list_by_author(user.id).await?;
        Ok((user, pagination::paginate(posts, PAGE_SIZE, page)))
    }

    /// One post with its comment thread. A post hidden from the viewer is
    /// indistinguishable from an absent one.
    pub async fn post_detail(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(Post, Vec<Comment>), DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;

        if !policy::is_visible(&post, viewer, now) {
            return Err(DomainError::PostNotFound(post_id));
        }

        let comments = self.comments.list_for_post(post.id).await?;
        Ok((post, comments))
    }

    /// Published categories, for the post form's choice list.
    pub async fn categories(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list_published().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::*;
    use chrono::Duration;

    fn service(store: &Store) -> ContentService<MemPosts, MemComments, MemCategories, MemUsers> {
        ContentService::new(
            store.posts.clone(),
            store.comments.clone(),
            store.categories.clone(),
            store.users.clone(),
        )
    }

    #[tokio::test]
    async fn index_and_latest_skip_the_scheduled_post() {
        let now = Utc::now();
        let store = Store::new();
        let author = store.add_user("alice");
        let category = store.add_category("travel", true);

        for hours_ago in 1..=5 {
            store.add_post(&author, &category, true, now - Duration::hours(hours_ago));
        }
        store.add_post(&author, &category, true, now + Duration::hours(1));

        let service = service(&store);

        let latest = service.latest(now).await.unwrap();
        assert_eq!(latest.len(), 5);
        let dates: Vec<_> = latest.iter().map(|p| p.pub_date).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted, "newest first");

        let page = service.index(1, now).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn hidden_category_hides_all_its_posts() {
        let now = Utc::now();
        let store = Store::new();
        let author = store.add_user("alice");
        let hidden = store.add_category("secret", false);
        for hours_ago in 1..=3 {
            store.add_post(&author, &hidden, true, now - Duration::hours(hours_ago));
        }
        let post = store.add_post(&author, &hidden, true, now - Duration::hours(4));

        let service = service(&store);

        assert!(service.index(1, now).await.unwrap().items.is_empty());
        assert!(service.latest(now).await.unwrap().is_empty());
        assert!(matches!(
            service.category("secret", 1, now).await,
            Err(DomainError::CategoryNotFound(_))
        ));

        // Direct access by a stranger is a 404, not a 403.
        let stranger = store.add_user("bob");
        assert!(matches!(
            service.post_detail(post.id, Some(stranger.id), now).await,
            Err(DomainError::PostNotFound(_))
        ));
        // The author still gets through.
        assert!(
            service
                .post_detail(post.id, Some(author.id), now)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn unknown_slug_and_username_are_not_found() {
        let store = Store::new();
        let service = service(&store);
        let now = Utc::now();

        assert!(matches!(
            service.category("nope", 1, now).await,
            Err(DomainError::CategoryNotFound(_))
        ));
        assert!(matches!(
            service.profile("ghost", 1).await,
            Err(DomainError::UserNotFound(_))
        ));
        assert!(matches!(
            service.post_detail(Uuid::new_v4(), None, now).await,
            Err(DomainError::PostNotFound(_))
        ));
    }

    #[tokio::test]
    async fn profile_lists_drafts_too() {
        let now = Utc::now();
        let store = Store::new();
        let author = store.add_user("alice");
        let category = store.add_category("travel", true);
        store.add_post(&author, &category, true, now - Duration::hours(1));
        store.add_post(&author, &category, false, now - Duration::hours(2));

        let service = service(&store);
        let (user, page) = service.profile("alice", 1).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn draft_is_visible_to_its_author_with_comments() {
        let now = Utc::now();
        let store = Store::new();
        let author = store.add_user("alice");
        let reader = store.add_user("bob");
        let category = store.add_category("travel", true);
        let draft = store.add_post(&author, &category, false, now - Duration::hours(1));
        store.add_comment(&author, draft.id, "note to self");

        let service = service(&store);

        assert!(matches!(
            service.post_detail(draft.id, None, now).await,
            Err(DomainError::PostNotFound(_))
        ));
        assert!(matches!(
            service.post_detail(draft.id, Some(reader.id), now).await,
            Err(DomainError::PostNotFound(_))
        ));

        let (post, comments) = service
            .post_detail(draft.id, Some(author.id), now)
            .await
            .unwrap();
        assert_eq!(post.id, draft.id);
        assert_eq!(comments.len(), 1);
    }

    #[tokio::test]
    async fn category_listing_paginates_by_ten() {
        let now = Utc::now();
        let store = Store::new();
        let author = store.add_user("alice");
        let category = store.add_category("travel", true);
        for hours_ago in 1..=13 {
            store.add_post(&author, &category, true, now - Duration::hours(hours_ago));
        }

        let service = service(&store);
        let (_, first) = service.category("travel", 1, now).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert!(first.has_next);
        let (_, second) = service.category("travel", 2, now).await.unwrap();
        assert_eq!(second.items.len(), 3);
        assert!(!second.has_next);
    }
}
