//! Session authentication extractors.
//!
//! The session is a signed token kept in the `yatube_session` cookie. A
//! `Bearer` authorization header is accepted as well.

use std::future::Future;
use std::pin::Pin;

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};
use serde::Serialize;

use yatube_core::error::RepoError;
use yatube_core::ports::{AuthError, BaseRepository};

use crate::middleware::error::AppError;
use crate::state::AppState;
use crate::urls;

pub const SESSION_COOKIE: &str = "yatube_session";

/// Authenticated user identity extractor.
///
/// Handlers taking an `Identity` are login-only: anonymous requests are
/// redirected to the login page with the original path in `next`.
/// ```ignore
/// async fn post_create(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

/// Failed authentication. Responds with a redirect to the login page.
#[derive(Debug, thiserror::Error)]
#[error("login required for {next}: {reason}")]
pub struct LoginRequired {
    pub reason: AuthError,
    pub next: String,
}

impl actix_web::ResponseError for LoginRequired {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, urls::login(&self.next)))
            .finish()
    }
}

fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Resolve a session token to a stored user.
///
/// The outer error is a storage failure. The inner one means the request is
/// anonymous, which includes a valid token for a deleted user.
async fn authenticate(
    state: Option<web::Data<AppState>>,
    token: Option<String>,
) -> Result<Result<Identity, AuthError>, RepoError> {
    let Some(state) = state else {
        tracing::error!("AppState not found in app data");
        return Ok(Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        )));
    };
    let Some(token) = token else {
        return Ok(Err(AuthError::MissingAuth));
    };
    let claims = match state.tokens.validate_token(&token) {
        Ok(claims) => claims,
        Err(e) => return Ok(Err(e)),
    };

    Ok(match state.users.find_by_id(claims.user_id).await? {
        Some(user) => Ok(Identity {
            user_id: user.id,
            username: user.username,
        }),
        None => Err(AuthError::InvalidToken(format!(
            "user {} no longer exists",
            claims.user_id
        ))),
    })
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = session_token(req);
        let next = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.path().to_string(), |pq| pq.as_str().to_string());

        Box::pin(async move {
            match authenticate(state, token).await {
                Ok(Ok(identity)) => Ok(identity),
                Ok(Err(reason)) => {
                    tracing::debug!(%reason, %next, "Login required");
                    Err(LoginRequired { reason, next }.into())
                }
                Err(e) => Err(AppError::from(e).into()),
            }
        })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
#[derive(Debug, Clone, Default)]
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|identity| identity.user_id)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = session_token(req);

        Box::pin(async move {
            match authenticate(state, token).await {
                Ok(identity) => Ok(OptionalIdentity(identity.ok())),
                Err(e) => Err(AppError::from(e).into()),
            }
        })
    }
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Cookie that makes the browser drop the session.
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;
    use crate::config::AppConfig;
    use yatube_core::domain::User;
    use yatube_infra::InMemoryStore;

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::in_memory(
            &InMemoryStore::new(),
            &AppConfig::default(),
        ))
    }

    async fn token_for(state: &AppState, username: &str) -> (User, String) {
        let user = state.users.save(User::new(username, "hash")).await.unwrap();
        let token = state.tokens.generate_token(user.id, &user.username).unwrap();
        (user, token)
    }

    #[actix_web::test]
    async fn test_identity_from_cookie() {
        let state = state();
        let (leo, token) = token_for(&state, "leo").await;
        let req = TestRequest::get()
            .app_data(state.clone())
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_http_request();

        let identity = Identity::extract(&req).await.unwrap();
        assert_eq!(identity.user_id, leo.id);
        assert_eq!(identity.username, "leo");
    }

    #[actix_web::test]
    async fn test_identity_from_bearer_header() {
        let state = state();
        token_for(&state, "leo").await;
        let (anna, token) = token_for(&state, "anna").await;
        let req = TestRequest::get()
            .app_data(state.clone())
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_http_request();

        assert_eq!(Identity::extract(&req).await.unwrap().user_id, anna.id);
    }

    #[actix_web::test]
    async fn test_missing_session_redirects_to_login() {
        let req = TestRequest::get()
            .uri("/follow/?page=2")
            .app_data(state())
            .to_http_request();

        let err = Identity::extract(&req).await.unwrap_err();
        let login = err.as_error::<LoginRequired>().unwrap();
        assert!(matches!(login.reason, AuthError::MissingAuth));
        assert_eq!(login.next, "/follow/?page=2");

        let response = err.error_response();
        assert_eq!(response.status(), actix_web::http::StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/login/?next=/follow/%3Fpage%3D2"
        );
    }

    #[actix_web::test]
    async fn test_session_of_deleted_user_is_anonymous() {
        let state = state();
        let (leo, token) = token_for(&state, "leo").await;
        state.users.delete(leo.id).await.unwrap();

        let req = TestRequest::get()
            .uri("/create/")
            .app_data(state.clone())
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_http_request();

        let err = Identity::extract(&req).await.unwrap_err();
        let login = err.as_error::<LoginRequired>().unwrap();
        assert!(matches!(login.reason, AuthError::InvalidToken(_)));
        assert_eq!(login.next, "/create/");

        let viewer = OptionalIdentity::extract(&req).await.unwrap();
        assert_eq!(viewer.user_id(), None);
    }

    #[actix_web::test]
    async fn test_optional_identity_never_fails() {
        let req = TestRequest::get()
            .app_data(state())
            .cookie(Cookie::new(SESSION_COOKIE, "garbage"))
            .to_http_request();

        let viewer = OptionalIdentity::extract(&req).await.unwrap();
        assert!(viewer.0.is_none());
        assert_eq!(viewer.user_id(), None);
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("token".to_string(), 60);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));

        let removal = expired_session_cookie();
        assert_eq!(removal.value(), "");
        assert_eq!(removal.max_age(), Some(Duration::ZERO));
    }
}
