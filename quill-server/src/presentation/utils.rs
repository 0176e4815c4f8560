use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::domain::user::Author;
use crate::infrastructure::security::SessionKeys;
use crate::presentation::render;
use crate::presentation::routes::Route;

/// The logged-in user, recovered from the signed `session` cookie. Extraction
/// failure is not a 401: the viewer is sent to the login page with the
/// original target preserved in `next`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
}

impl From<&CurrentUser> for Author {
    fn from(user: &CurrentUser) -> Self {
        Author {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// `Some` when a valid session cookie is present, `None` for anonymous
/// visitors. Never fails; used by the viewer-aware read surfaces.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|user| user.id)
    }
}

fn authenticate(req: &HttpRequest) -> Option<CurrentUser> {
    let keys = req.app_data::<web::Data<SessionKeys>>()?;
    let cookie = req.cookie("session")?;
    let claims = keys.verify(cookie.value()).ok()?;
    let id = Uuid::parse_str(&claims.sub).ok()?;
    Some(CurrentUser {
        id,
        username: claims.username,
    })
}

fn original_target(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match authenticate(req) {
            Some(user) => ready(Ok(user)),
            None => ready(Err(LoginRedirect {
                next: original_target(req),
            }
            .into())),
        }
    }
}

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(authenticate(req))))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("authentication required")]
pub struct LoginRedirect {
    next: String,
}

impl ResponseError for LoginRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        render::see_other(
            &Route::Login {
                next: self.next.clone(),
            }
            .path(),
        )
    }
}
