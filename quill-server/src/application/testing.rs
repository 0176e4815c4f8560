//! In-memory repository implementations backing the service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::{Author, User};

#[derive(Default)]
pub struct MemPosts(Mutex<Vec<Post>>);

#[async_trait]
impl PostRepository for MemPosts {
    async fn create(&self, post: &Post) -> Result<(), DomainError> {
        self.0.lock().unwrap().push(post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.0.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list_recent(&self) -> Result<Vec<Post>, DomainError> {
        let mut posts = self.0.lock().unwrap().clone();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        Ok(posts)
    }

    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, DomainError> {
        let mut posts: Vec<Post> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.category.id == category_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        Ok(posts)
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError> {
        let mut posts: Vec<Post> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.author.id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        Ok(posts)
    }

    async fn update(&self, post: &Post) -> Result<bool, DomainError> {
        let mut posts = self.0.lock().unwrap();
        match posts.iter_mut().find(|p| p.id == post.id) {
            Some(slot) => {
                *slot = post.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut posts = self.0.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }
}

#[derive(Default)]
pub struct MemComments(Mutex<Vec<Comment>>);

#[async_trait]
impl CommentRepository for MemComments {
    async fn create(&self, comment: &Comment) -> Result<(), DomainError> {
        self.0.lock().unwrap().push(comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, DomainError> {
        Ok(self.0.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let mut comments: Vec<Comment> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn update(&self, comment: &Comment) -> Result<bool, DomainError> {
        let mut comments = self.0.lock().unwrap();
        match comments.iter_mut().find(|c| c.id == comment.id) {
            Some(slot) => {
                *slot = comment.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut comments = self.0.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.id != id);
        Ok(comments.len() < before)
    }
}

#[derive(Default)]
pub struct MemCategories(Mutex<Vec<Category>>);

#[async_trait]
impl CategoryRepository for MemCategories {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        Ok(self.0.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn list_published(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_published)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemUsers(Mutex<Vec<User>>);

#[async_trait]
impl UserRepository for MemUsers {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.0.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(DomainError::UserAlreadyExists(
                "username already taken".to_string(),
            ));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::UserAlreadyExists(
                "email already registered".to_string(),
            ));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.0.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_profile(&self, user: &User) -> Result<bool, DomainError> {
        let mut users = self.0.lock().unwrap();
        if users
            .iter()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(DomainError::UserAlreadyExists(
                "username already taken".to_string(),
            ));
        }
        if users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(DomainError::UserAlreadyExists(
                "email already registered".to_string(),
            ));
        }
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// One in-memory store shared by all four repositories, plus seeding helpers.
pub struct Store {
    pub posts: Arc<MemPosts>,
    pub comments: Arc<MemComments>,
    pub categories: Arc<MemCategories>,
    pub users: Arc<MemUsers>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            posts: Arc::new(MemPosts::default()),
            comments: Arc::new(MemComments::default()),
            categories: Arc::new(MemCategories::default()),
            users: Arc::new(MemUsers::default()),
        }
    }

    pub fn add_user(&self, username: &str) -> User {
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "hash".to_string(),
        );
        self.users.0.lock().unwrap().push(user.clone());
        user
    }

    pub fn add_category(&self, slug: &str, is_published: bool) -> Category {
        let category = Category {
            id: Uuid::new_v4(),
            title: slug.to_string(),
            description: String::new(),
            slug: slug.to_string(),
            is_published,
            created_at: Utc::now(),
        };
        self.categories.0.lock().unwrap().push(category.clone());
        category
    }

    pub fn add_post(
        &self,
        author: &User,
        category: &Category,
        is_published: bool,
        pub_date: DateTime<Utc>,
    ) -> Post {
        let post = Post::new(
            Author::from(author),
            category.into(),
            "title".to_string(),
            "text".to_string(),
            pub_date,
            is_published,
        );
        self.posts.0.lock().unwrap().push(post.clone());
        post
    }

    pub fn add_comment(&self, author: &User, post_id: Uuid, text: &str) -> Comment {
        let comment = Comment::new(Author::from(author), post_id, text.to_string());
        self.comments.0.lock().unwrap().push(comment.clone());
        comment
    }

    pub fn get_post(&self, id: Uuid) -> Option<Post> {
        self.posts.0.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }

    pub fn get_comment(&self, id: Uuid) -> Option<Comment> {
        self.comments
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }
}
