//! Rendering boundary. Handlers hand a template identifier and a context
//! mapping here; the response is a JSON envelope the view layer consumes.

use actix_web::HttpResponse;
use actix_web::http::header;
use serde_json::{Value, json};

fn envelope(template: &str, context: Value) -> Value {
    json!({ "template": template, "context": context })
}

pub fn view(template: &str, context: Value) -> HttpResponse {
    HttpResponse::Ok().json(envelope(template, context))
}

/// Form redisplay after a validation failure; nothing was persisted.
pub fn invalid_form(template: &str, context: Value) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(envelope(template, context))
}

pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(envelope("pages/404", json!({})))
}

pub fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(envelope(
        "registration/login",
        json!({ "errors": { "__all__": "invalid credentials" } }),
    ))
}

pub fn conflict(message: &str) -> HttpResponse {
    HttpResponse::Conflict().json(envelope(
        "registration/registration_form",
        json!({ "errors": { "__all__": message } }),
    ))
}

pub fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(envelope("pages/500", json!({})))
}
