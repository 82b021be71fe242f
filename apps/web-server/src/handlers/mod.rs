//! HTTP handlers and route configuration.

mod auth;
mod follow;
mod health;
mod posts;


use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;

use crate::middleware::error::{AppError, AppResult};
use crate::templates;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(extractor_errors::path_config())
        .app_data(extractor_errors::query_config())
        .app_data(extractor_errors::form_config())
        .route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route(r"/posts/{post_id:\d+}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .service(
            web::resource(r"/posts/{post_id:\d+}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route(
            r"/posts/{post_id:\d+}/comment/",
            web::post().to(posts::add_comment),
        )
        // Follows
        .route("/follow/", web::get().to(follow::follow_index))
        .service(
            web::resource("/profile/{username}/follow/")
                .route(web::get().to(follow::profile_follow))
                .route(web::post().to(follow::profile_follow)),
        )
        .service(
            web::resource("/profile/{username}/unfollow/")
                .route(web::get().to(follow::profile_unfollow))
                .route(web::post().to(follow::profile_unfollow)),
        )
        // Accounts
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(auth::signup_form))
                        .route(web::post().to(auth::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .service(
                    web::resource("/logout/")
                        .route(web::get().to(auth::logout))
                        .route(web::post().to(auth::logout)),
                ),
        )
        .route("/health", web::get().to(health::health_check))
        .default_service(web::to(not_found));
}

/// Extractor failures rendered through `AppError` like any other error.
mod extractor_errors {
    use actix_web::web;

    use crate::middleware::error::AppError;

    /// A path segment that matched the route but does not parse (an id past
    /// `i64::MAX`) names a page that cannot exist.
    pub fn path_config() -> web::PathConfig {
        web::PathConfig::default()
            .error_handler(|err, req| AppError::NotFound(format!("{}: {err}", req.path())).into())
    }

    pub fn query_config() -> web::QueryConfig {
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
    }

    pub fn form_config() -> web::FormConfig {
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
    }
}

async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(req.path().to_string()))
}

/// Render `template` into a 200 HTML response.
fn render(template: &str, context: &Context) -> AppResult<HttpResponse> {
    templates::render(template, context)
        .map(html)
        .map_err(AppError::Template)
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}
