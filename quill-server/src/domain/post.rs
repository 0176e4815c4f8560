use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::category::CategoryRef;
use crate::domain::user::Author;

/// Post aggregate. The author and category references are always attached so
/// rendering a listing never goes back to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    pub category: CategoryRef,
}

impl Post {
    pub fn new(
        author: Author,
        category: CategoryRef,
        title: String,
        text: String,
        pub_date: DateTime<Utc>,
        is_published: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            text,
            pub_date,
            is_published,
            created_at: Utc::now(),
            author,
            category,
        }
    }
}
