pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod utils;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::content_service::ContentService;
use crate::application::post_service::PostService;
use crate::data::category_repository::PostgresCategoryRepository;
use crate::data::comment_repository::PostgresCommentRepository;
use crate::data::post_repository::PostgresPostRepository;
use crate::data::user_repository::PostgresUserRepository;

// Concrete service types the handlers receive through app data.
pub type Content = ContentService<
    PostgresPostRepository,
    PostgresCommentRepository,
    PostgresCategoryRepository,
    PostgresUserRepository,
>;
pub type Posts = PostService<PostgresPostRepository, PostgresCategoryRepository>;
pub type Comments = CommentService<PostgresCommentRepository, PostgresPostRepository>;
pub type Accounts = AuthService<PostgresUserRepository>;
