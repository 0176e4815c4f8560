use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde_json::json;

use crate::application::pagination::parse_page;
use crate::domain::error::DomainError;
use crate::presentation::Content;
use crate::presentation::forms::PageQuery;
use crate::presentation::render;

#[get("/")]
pub async fn index(
    content: web::Data<Content>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = content
        .index(parse_page(query.page.as_deref()), Utc::now())
        .await?;
    Ok(render::view("blog/index", json!({ "page": page })))
}

/// Legacy front-page feed: the five newest live posts, unpaginated.
#[get("/latest")]
pub async fn latest(content: web::Data<Content>) -> Result<HttpResponse, DomainError> {
    let posts = content.latest(Utc::now()).await?;
    Ok(render::view("blog/index", json!({ "posts": posts })))
}

#[get("/category/{slug}")]
pub async fn category(
    content: web::Data<Content>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let slug = path.into_inner();
    let (category, page) = content
        .category(&slug, parse_page(query.page.as_deref()), Utc::now())
        .await?;
    Ok(render::view(
        "blog/category",
        json!({ "category": category, "page": page }),
    ))
}
