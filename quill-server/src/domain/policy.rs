use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::post::Post;

/// A post is live when it may appear on public listings: both the post and its
/// category are published and the publication date is not in the future.
pub fn is_live(post: &Post, now: DateTime<Utc>) -> bool {
    post.is_published && post.category.is_published && post.pub_date <= now
}

/// Authors always see their own posts, drafts and scheduled ones included.
/// Everyone else only sees live posts. `viewer` is `None` for anonymous
/// visitors; `now` is passed in explicitly so callers and tests control time.
pub fn is_visible(post: &Post, viewer: Option<Uuid>, now: DateTime<Utc>) -> bool {
    viewer == Some(post.author.id) || is_live(post, now)
}

pub fn can_mutate(author_id: Uuid, viewer_id: Uuid) -> bool {
    author_id == viewer_id
}

/// Outcome of the ownership gate applied before every update/delete. A denied
/// mutation is not an error page; the caller redirects to `T` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate<T> {
    Allowed,
    Deny(T),
}

pub fn ownership_gate<T>(author_id: Uuid, viewer_id: Uuid, redirect: T) -> Gate<T> {
    if can_mutate(author_id, viewer_id) {
        Gate::Allowed
    } else {
        Gate::Deny(redirect)
    }
}
