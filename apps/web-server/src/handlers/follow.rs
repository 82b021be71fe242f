//! Subscription feed and the follow/unfollow toggle.

use actix_web::{HttpResponse, web};

use yatube_core::DomainError;
use yatube_core::domain::User;
use yatube_core::pagination::paginate_posts;
use yatube_core::ports::PostFilter;
use yatube_core::services::{
    FollowOutcome, profile_follow as follow_author, profile_unfollow as unfollow_author,
};
use yatube_shared::dto::PageQuery;

use super::{redirect, render};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::{templates, urls};

/// GET /follow/
pub async fn follow_index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = paginate_posts(
        state.posts.as_ref(),
        PostFilter::FollowedBy(identity.user_id),
        &state.paginator,
        query.page.as_deref(),
    )
    .await?;

    let mut context = templates::base_context(Some(&identity));
    context.insert("page", &page);
    render("posts/follow.html", &context)
}

async fn find_author(state: &AppState, username: &str) -> AppResult<User> {
    state
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", username).into())
}

/// GET|POST /profile/{username}/follow/
pub async fn profile_follow(
    state: web::Data<AppState>,
    identity: Identity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = find_author(&state, &username).await?;

    match follow_author(state.follows.as_ref(), identity.user_id, author.id).await? {
        FollowOutcome::Created => {
            tracing::info!(user = %identity.username, author = %author.username, "Followed");
        }
        outcome => {
            tracing::debug!(
                user = %identity.username,
                author = %author.username,
                ?outcome,
                "Follow unchanged"
            );
        }
    }

    Ok(redirect(&urls::profile(&author.username)))
}

/// GET|POST /profile/{username}/unfollow/
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = find_author(&state, &username).await?;

    let removed = unfollow_author(state.follows.as_ref(), identity.user_id, author.id).await?;
    tracing::info!(
        user = %identity.username,
        author = %author.username,
        removed,
        "Unfollowed"
    );

    Ok(redirect(&urls::profile(&author.username)))
}
