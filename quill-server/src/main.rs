mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpServer, web};

use application::auth_service::AuthService;
use application::comment_service::CommentService;
use application::content_service::ContentService;
use application::post_service::PostService;
use data::category_repository::PostgresCategoryRepository;
use data::comment_repository::PostgresCommentRepository;
use data::post_repository::PostgresPostRepository;
use data::user_repository::PostgresUserRepository;
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::security::SessionKeys;
use presentation::handlers;
use presentation::middleware::RequestTrace;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = AppConfig::from_env().expect("invalid configuration");
    let pool = create_pool(&config.database_url)
        .await
        .expect("failed to connect to database");
    run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));
    let comment_repo = Arc::new(PostgresCommentRepository::new(pool.clone()));
    let category_repo = Arc::new(PostgresCategoryRepository::new(pool.clone()));

    let keys = SessionKeys::new(config.session_secret.clone());
    let auth_service = AuthService::new(Arc::clone(&user_repo), keys.clone());
    let content_service = ContentService::new(
        Arc::clone(&post_repo),
        Arc::clone(&comment_repo),
        Arc::clone(&category_repo),
        Arc::clone(&user_repo),
    );
    let post_service = PostService::new(Arc::clone(&post_repo), Arc::clone(&category_repo));
    let comment_service = CommentService::new(Arc::clone(&comment_repo), Arc::clone(&post_repo));

    let config_data = config.clone();

    HttpServer::new(move || {
        let cors = build_cors(&config_data);
        App::new()
            .wrap(RequestTrace)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .app_data(web::Data::new(content_service.clone()))
            .app_data(web::Data::new(post_service.clone()))
            .app_data(web::Data::new(comment_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(keys.clone()))
            .service(handlers::auth::scope())
            .service(handlers::feed::index)
            .service(handlers::feed::latest)
            .service(handlers::feed::category)
            // Fixed segments before the parameterised routes.
            .service(handlers::post::create_form)
            .service(handlers::post::create)
            .service(handlers::post::detail)
            .service(handlers::post::edit_form)
            .service(handlers::post::update)
            .service(handlers::post::delete)
            .service(handlers::comment::create)
            .service(handlers::comment::edit_form)
            .service(handlers::comment::update)
            .service(handlers::comment::delete)
            .service(handlers::profile::edit_form)
            .service(handlers::profile::update)
            .service(handlers::profile::detail)
            .service(handlers::pages::about)
            .service(handlers::pages::rules)
            .default_service(web::route().to(handlers::pages::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
