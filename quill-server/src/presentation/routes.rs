use uuid::Uuid;

/// Named routes, used symbolically wherever a handler redirects.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Index,
    PostDetail(Uuid),
    CategoryDetail(String),
    Profile(String),
    Login { next: String },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Index => "/".to_string(),
            Route::PostDetail(post_id) => format!("/posts/{post_id}"),
            Route::CategoryDetail(slug) => format!("/category/{slug}"),
            Route::Profile(username) => format!("/profile/{username}"),
            Route::Login { next } => {
                // The original target goes through the query string, so it
                // must survive reserved characters like `&` and `#`.
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("next", next)
                    .finish();
                format!("/auth/login?{query}")
            }
        }
    }
}
