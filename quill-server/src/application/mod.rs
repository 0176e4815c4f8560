pub mod auth_service;
pub mod comment_service;
pub mod content_service;
pub mod pagination;
pub mod post_service;

#[cfg(test)]
pub mod testing;
