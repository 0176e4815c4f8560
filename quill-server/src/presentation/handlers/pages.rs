use actix_web::{HttpResponse, get};
use serde_json::json;

use crate::presentation::render;

#[get("/pages/about")]
pub async fn about() -> HttpResponse {
    render::view("pages/about", json!({}))
}

#[get("/pages/rules")]
pub async fn rules() -> HttpResponse {
    render::view("pages/rules", json!({}))
}

/// Fallback for every unmatched path.
pub async fn not_found() -> HttpResponse {
    render::not_found()
}
