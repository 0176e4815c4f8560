use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::application::comment_service::CommentService;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::policy::{self, Gate};
use crate::presentation::Comments;
use crate::presentation::forms::{CommentForm, validate_comment};
use crate::presentation::handlers::request_id;
use crate::presentation::render;
use crate::presentation::routes::Route;
use crate::presentation::utils::CurrentUser;

/// Comment pipeline. The target post is resolved (with visibility applied)
/// before field validation, so a missing or hidden post is 404 regardless of
/// what was submitted.
async fn apply_create<C, P>(
    req: &HttpRequest,
    user: &CurrentUser,
    comments: &CommentService<C, P>,
    post_id: Uuid,
    payload: CommentForm,
) -> Result<HttpResponse, DomainError>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    let now = Utc::now();
    comments.visible_post(post_id, Some(user.id), now).await?;

    let text = match validate_comment(&payload) {
        Ok(text) => text,
        Err(errors) => {
            return Ok(render::invalid_form(
                "blog/detail",
                json!({ "form": payload, "errors": errors, "post_id": post_id }),
            ));
        }
    };

    let comment = comments.create(user.into(), post_id, text, now).await?;

    info!(
        request_id = %request_id(req),
        username = %user.username,
        comment_id = %comment.id,
        "comment created"
    );

    Ok(render::see_other(&Route::PostDetail(post_id).path()))
}

#[post("/posts/{post_id}/comment")]
pub async fn create(
    req: HttpRequest,
    user: CurrentUser,
    comments: web::Data<Comments>,
    payload: web::Form<CommentForm>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    apply_create(&req, &user, &comments, path.into_inner(), payload.into_inner()).await
}

#[get("/posts/{post_id}/comments/{comment_id}/edit")]
pub async fn edit_form(
    user: CurrentUser,
    comments: web::Data<Comments>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    let comment = comments.get(post_id, comment_id).await?;
    if let Gate::Deny(route) =
        policy::ownership_gate(comment.author.id, user.id, Route::PostDetail(post_id))
    {
        return Ok(render::see_other(&route.path()));
    }

    Ok(render::view(
        "blog/comment",
        json!({ "form": CommentForm { text: comment.text.clone() }, "comment": comment }),
    ))
}

/// Same gate order for edits: resolve the comment and check ownership before
/// validating the submitted text.
async fn apply_update<C, P>(
    req: &HttpRequest,
    user: &CurrentUser,
    comments: &CommentService<C, P>,
    post_id: Uuid,
    comment_id: Uuid,
    payload: CommentForm,
) -> Result<HttpResponse, DomainError>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    let comment = comments.get(post_id, comment_id).await?;
    if let Gate::Deny(route) =
        policy::ownership_gate(comment.author.id, user.id, Route::PostDetail(post_id))
    {
        return Ok(render::see_other(&route.path()));
    }

    let text = match validate_comment(&payload) {
        Ok(text) => text,
        Err(errors) => {
            return Ok(render::invalid_form(
                "blog/comment",
                json!({ "form": payload, "errors": errors }),
            ));
        }
    };

    let comment = comments.update(post_id, comment_id, user.id, text).await?;

    info!(
        request_id = %request_id(req),
        username = %user.username,
        comment_id = %comment.id,
        "comment updated"
    );

    Ok(render::see_other(&Route::PostDetail(post_id).path()))
}

#[post("/posts/{post_id}/comments/{comment_id}/edit")]
pub async fn update(
    req: HttpRequest,
    user: CurrentUser,
    comments: web::Data<Comments>,
    payload: web::Form<CommentForm>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    apply_update(&req, &user, &comments, post_id, comment_id, payload.into_inner()).await
}

#[post("/posts/{post_id}/comments/{comment_id}/delete")]
pub async fn delete(
    req: HttpRequest,
    user: CurrentUser,
    comments: web::Data<Comments>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    comments.delete(post_id, comment_id, user.id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        comment_id = %comment_id,
        "comment deleted"
    );

    Ok(render::see_other(&Route::PostDetail(post_id).path()))
}
