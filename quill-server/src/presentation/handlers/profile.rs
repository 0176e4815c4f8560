use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::json;
use tracing::info;

use crate::application::auth_service::AuthService;
use crate::application::pagination::parse_page;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::presentation::forms::{PageQuery, ProfileForm, validate_profile};
use crate::presentation::handlers::request_id;
use crate::presentation::render;
use crate::presentation::routes::Route;
use crate::presentation::utils::CurrentUser;
use crate::presentation::{Accounts, Content};

/// Registered before `/profile/{username}` so "edit" is not read as a name.
#[get("/profile/edit")]
pub async fn edit_form(
    user: CurrentUser,
    accounts: web::Data<Accounts>,
) -> Result<HttpResponse, DomainError> {
    let user = accounts.get_user(user.id).await?;
    let form = ProfileForm {
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
    };
    Ok(render::view("blog/user", json!({ "form": form })))
}

/// A taken username or email is a recoverable form error here, not a
/// conflict page: the profile form comes back with the message inline.
async fn apply_update<R>(
    req: &HttpRequest,
    user: &CurrentUser,
    accounts: &AuthService<R>,
    payload: ProfileForm,
) -> Result<HttpResponse, DomainError>
where
    R: UserRepository + 'static,
{
    let input = match validate_profile(&payload) {
        Ok(input) => input,
        Err(errors) => {
            return Ok(render::invalid_form(
                "blog/user",
                json!({ "form": payload, "errors": errors }),
            ));
        }
    };

    match accounts.update_profile(user.id, input).await {
        Ok(updated) => {
            info!(
                request_id = %request_id(req),
                user_id = %updated.id,
                "profile updated"
            );
            Ok(render::see_other(&Route::Profile(updated.username).path()))
        }
        Err(DomainError::UserAlreadyExists(message)) => Ok(render::invalid_form(
            "blog/user",
            json!({ "form": payload, "errors": { "__all__": message } }),
        )),
        Err(other) => Err(other),
    }
}

#[post("/profile/edit")]
pub async fn update(
    req: HttpRequest,
    user: CurrentUser,
    accounts: web::Data<Accounts>,
    payload: web::Form<ProfileForm>,
) -> Result<HttpResponse, DomainError> {
    apply_update(&req, &user, &accounts, payload.into_inner()).await
}

#[get("/profile/{username}")]
pub async fn detail(
    content: web::Data<Content>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let username = path.into_inner();
    let (profile, page) = content
        .profile(&username, parse_page(query.page.as_deref()))
        .await?;
    Ok(render::view(
        "blog/profile",
        json!({ "profile": profile, "page": page }),
    ))
}
