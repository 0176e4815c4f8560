use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Scope, get, post, web};
use serde_json::json;
use tracing::info;

use crate::domain::error::DomainError;
use crate::presentation::Accounts;
use crate::presentation::forms::{LoginForm, NextQuery, RegistrationForm, validate_registration};
use crate::presentation::handlers::request_id;
use crate::presentation::render;
use crate::presentation::routes::Route;

pub fn scope() -> Scope {
    web::scope("/auth")
        .service(login_form)
        .service(login)
        .service(logout)
        .service(registration_form)
        .service(register)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build("session", token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn signed_in(token: String, location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(session_cookie(token))
        .finish()
}

#[get("/login")]
async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    render::view(
        "registration/login",
        json!({ "next": query.next.clone().unwrap_or_default() }),
    )
}

#[post("/login")]
async fn login(
    req: HttpRequest,
    accounts: web::Data<Accounts>,
    payload: web::Form<LoginForm>,
) -> Result<HttpResponse, DomainError> {
    match accounts.login(&payload.username, &payload.password).await {
        Ok((user, token)) => {
            info!(request_id = %request_id(&req), username = %user.username, "user logged in");
            let next = payload
                .next
                .clone()
                .filter(|next| next.starts_with('/'))
                .unwrap_or_else(|| Route::Index.path());
            Ok(signed_in(token, &next))
        }
        Err(DomainError::Unauthorized) => Ok(render::invalid_form(
            "registration/login",
            json!({
                "form": { "username": payload.username },
                "errors": { "__all__": "invalid username or password" },
            }),
        )),
        Err(other) => Err(other),
    }
}

#[post("/logout")]
async fn logout() -> HttpResponse {
    let mut cookie = Cookie::new("session", "");
    cookie.set_path("/");
    cookie.make_removal();
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, Route::Index.path()))
        .cookie(cookie)
        .finish()
}

#[get("/registration")]
async fn registration_form() -> HttpResponse {
    render::view("registration/registration_form", json!({ "form": {} }))
}

#[post("/registration")]
async fn register(
    req: HttpRequest,
    accounts: web::Data<Accounts>,
    payload: web::Form<RegistrationForm>,
) -> Result<HttpResponse, DomainError> {
    let input = match validate_registration(&payload) {
        Ok(input) => input,
        Err(errors) => {
            return Ok(render::invalid_form(
                "registration/registration_form",
                json!({ "form": payload.into_inner(), "errors": errors }),
            ));
        }
    };

    let (user, token) = accounts.register(input).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        username = %user.username,
        "user registered"
    );

    Ok(signed_in(token, &Route::Index.path()))
}
