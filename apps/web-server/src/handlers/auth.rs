//! Signup, login and logout pages.

use actix_web::{HttpResponse, web};

use yatube_core::RepoError;
use yatube_core::domain::User;
use yatube_core::forms::{FormErrors, SignupForm};
use yatube_core::ports::BaseRepository;
use yatube_shared::dto::{LoginFormData, NextQuery, SignupFormData};

use super::render;
use crate::middleware::auth::{OptionalIdentity, expired_session_cookie, session_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::{templates, urls};

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Issue a session for `user` and redirect to `target`.
fn start_session(state: &AppState, user: &User, target: &str) -> AppResult<HttpResponse> {
    let token = state.tokens.generate_token(user.id, &user.username)?;
    let cookie = session_cookie(token, state.tokens.expiration_seconds());

    Ok(HttpResponse::Found()
        .insert_header((actix_web::http::header::LOCATION, target))
        .cookie(cookie)
        .finish())
}

fn signup_page(
    viewer: &OptionalIdentity,
    form: &SignupFormData,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut context = templates::base_context(viewer.identity());
    // never echo passwords back
    context.insert("username", &form.username);
    context.insert("errors", errors);
    render("users/signup.html", &context)
}

/// GET /auth/signup/
pub async fn signup_form(viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    signup_page(&viewer, &SignupFormData::default(), &FormErrors::new())
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    form: web::Form<SignupFormData>,
) -> AppResult<HttpResponse> {
    let data = form.into_inner();

    let cleaned = match SignupForm::validate(&data.username, &data.password, &data.password_confirm)
    {
        Ok(cleaned) => cleaned,
        Err(errors) => return signup_page(&viewer, &data, &errors),
    };

    let mut taken = FormErrors::new();
    taken.add("username", USERNAME_TAKEN);

    if state.users.find_by_username(&cleaned.username).await?.is_some() {
        return signup_page(&viewer, &data, &taken);
    }

    let password_hash = state.passwords.hash(&cleaned.password)?;
    let user = match state
        .users
        .save(User::new(cleaned.username, password_hash))
        .await
    {
        Ok(user) => user,
        // lost a race with a concurrent signup
        Err(RepoError::Constraint(_)) => return signup_page(&viewer, &data, &taken),
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = user.id, username = %user.username, "User signed up");

    start_session(&state, &user, "/")
}

fn login_page(
    viewer: &OptionalIdentity,
    username: &str,
    next: &str,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut context = templates::base_context(viewer.identity());
    context.insert("username", username);
    context.insert("next", next);
    context.insert("errors", errors);
    render("users/login.html", &context)
}

/// GET /auth/login/
pub async fn login_form(
    viewer: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    let next = query.next.as_deref().unwrap_or_default();
    login_page(&viewer, "", next, &FormErrors::new())
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    form: web::Form<LoginFormData>,
) -> AppResult<HttpResponse> {
    let data = form.into_inner();
    let username = data.username.trim();

    let user = match state.users.find_by_username(username).await? {
        Some(user) if state.passwords.verify(&data.password, &user.password_hash)? => user,
        _ => {
            tracing::warn!(%username, "Login failed");
            let mut errors = FormErrors::new();
            errors.add("form", BAD_CREDENTIALS);
            return login_page(&viewer, username, &data.next, &errors);
        }
    };
    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    let target = if urls::is_local(&data.next) {
        data.next.as_str()
    } else {
        "/"
    };
    start_session(&state, &user, target)
}

/// GET|POST /auth/logout/
pub async fn logout(viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    if let Some(identity) = viewer.identity() {
        tracing::info!(username = %identity.username, "User logged out");
    }

    let context = templates::base_context(None);
    let mut response = render("users/logged_out.html", &context)?;
    response
        .add_cookie(&expired_session_cookie())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}
