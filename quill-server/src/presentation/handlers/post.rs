use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::application::post_service::PostService;
use crate::data::category_repository::CategoryRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::policy::{self, Gate};
use crate::presentation::forms::{PostForm, validate_post};
use crate::presentation::handlers::request_id;
use crate::presentation::render;
use crate::presentation::routes::Route;
use crate::presentation::utils::{CurrentUser, MaybeUser};
use crate::presentation::{Content, Posts};

#[get("/posts/{post_id}")]
pub async fn detail(
    content: web::Data<Content>,
    viewer: MaybeUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let (post, comments) = content
        .post_detail(path.into_inner(), viewer.id(), Utc::now())
        .await?;
    Ok(render::view(
        "blog/detail",
        json!({ "post": post, "comments": comments }),
    ))
}

#[get("/posts/create")]
pub async fn create_form(
    content: web::Data<Content>,
    _user: CurrentUser,
) -> Result<HttpResponse, DomainError> {
    let categories = content.categories().await?;
    Ok(render::view(
        "blog/create",
        json!({ "form": {}, "categories": categories }),
    ))
}

#[post("/posts/create")]
pub async fn create(
    req: HttpRequest,
    user: CurrentUser,
    posts: web::Data<Posts>,
    payload: web::Form<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let input = match validate_post(&payload) {
        Ok(input) => input,
        Err(errors) => {
            return Ok(render::invalid_form(
                "blog/create",
                json!({ "form": payload.into_inner(), "errors": errors }),
            ));
        }
    };

    let post = posts.create((&user).into(), input, Utc::now()).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post.id,
        "post created"
    );

    Ok(render::see_other(&Route::PostDetail(post.id).path()))
}

#[get("/posts/{post_id}/edit")]
pub async fn edit_form(
    user: CurrentUser,
    content: web::Data<Content>,
    posts: web::Data<Posts>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.get(path.into_inner()).await?;
    if let Gate::Deny(route) =
        policy::ownership_gate(post.author.id, user.id, Route::PostDetail(post.id))
    {
        return Ok(render::see_other(&route.path()));
    }

    let categories = content.categories().await?;
    let form = PostForm {
        title: post.title.clone(),
        text: post.text.clone(),
        category_id: post.category.id.to_string(),
        pub_date: Some(post.pub_date.to_rfc3339()),
        is_published: Some(post.is_published.to_string()),
    };
    Ok(render::view(
        "blog/create",
        json!({ "form": form, "categories": categories, "post_id": post.id }),
    ))
}

/// Edit pipeline. The target is resolved and the ownership gate runs before
/// any field validation, so a missing post is 404 and a foreign post
/// redirects even when the submitted fields are bad.
async fn apply_update<P, G>(
    req: &HttpRequest,
    user: &CurrentUser,
    posts: &PostService<P, G>,
    post_id: Uuid,
    payload: PostForm,
) -> Result<HttpResponse, DomainError>
where
    P: PostRepository + 'static,
    G: CategoryRepository + 'static,
{
    let post = posts.get(post_id).await?;
    if let Gate::Deny(route) =
        policy::ownership_gate(post.author.id, user.id, Route::PostDetail(post_id))
    {
        return Ok(render::see_other(&route.path()));
    }

    let input = match validate_post(&payload) {
        Ok(input) => input,
        Err(errors) => {
            return Ok(render::invalid_form(
                "blog/create",
                json!({ "form": payload, "errors": errors, "post_id": post_id }),
            ));
        }
    };

    let post = posts.update(post_id, user.id, input).await?;

    info!(
        request_id = %request_id(req),
        username = %user.username,
        post_id = %post.id,
        "post updated"
    );

    Ok(render::see_other(&Route::PostDetail(post.id).path()))
}

#[post("/posts/{post_id}/edit")]
pub async fn update(
    req: HttpRequest,
    user: CurrentUser,
    posts: web::Data<Posts>,
    payload: web::Form<PostForm>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    apply_update(&req, &user, &posts, path.into_inner(), payload.into_inner()).await
}

#[post("/posts/{post_id}/delete")]
pub async fn delete(
    req: HttpRequest,
    user: CurrentUser,
    posts: web::Data<Posts>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    posts.delete(post_id, user.id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post_id,
        "post deleted"
    );

    Ok(render::see_other(&Route::Index.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::*;
    use crate::domain::user::User;
    use actix_web::http::{StatusCode, header};
    use actix_web::test::TestRequest;
    use chrono::Utc;

    fn service(store: &Store) -> PostService<MemPosts, MemCategories> {
        PostService::new(store.posts.clone(), store.categories.clone())
    }

    fn current(user: &User) -> CurrentUser {
        CurrentUser {
            id: user.id,
            username: user.username.clone(),
        }
    }

    fn blank_form() -> PostForm {
        PostForm {
            title: "".into(),
            text: "".into(),
            category_id: "".into(),
            pub_date: None,
            is_published: None,
        }
    }

    #[tokio::test]
    async fn editing_a_missing_post_is_not_found_even_with_bad_fields() {
        let store = Store::new();
        let user = store.add_user("alice");
        let req = TestRequest::default().to_http_request();

        let result = apply_update(
            &req,
            &current(&user),
            &service(&store),
            Uuid::new_v4(),
            blank_form(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn non_owner_edit_redirects_before_field_errors() {
        let store = Store::new();
        let owner = store.add_user("alice");
        let intruder = store.add_user("mallory");
        let category = store.add_category("travel", true);
        let post = store.add_post(&owner, &category, true, Utc::now());
        let req = TestRequest::default().to_http_request();

        let response = apply_update(
            &req,
            &current(&intruder),
            &service(&store),
            post.id,
            blank_form(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .unwrap()
                .to_str()
                .unwrap(),
            Route::PostDetail(post.id).path()
        );
    }

    #[tokio::test]
    async fn owner_with_bad_fields_gets_the_form_back() {
        let store = Store::new();
        let owner = store.add_user("alice");
        let category = store.add_category("travel", true);
        let post = store.add_post(&owner, &category, true, Utc::now());
        let req = TestRequest::default().to_http_request();

        let response = apply_update(
            &req,
            &current(&owner),
            &service(&store),
            post.id,
            blank_form(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(store.get_post(post.id).unwrap().title, post.title);
    }
}
