//! Post listings, detail, create/edit and comments.

use actix_web::{HttpRequest, HttpResponse, web};

use yatube_core::DomainError;
use yatube_core::domain::{Comment, Group, Post, PostDetails};
use yatube_core::forms::{CommentForm, FormErrors, PostForm};
use yatube_core::pagination::paginate_posts;
use yatube_core::ports::{BaseRepository, PostFilter};
use yatube_core::services::is_following;
use yatube_shared::dto::{CommentFormData, PageQuery, PostFormData};

use super::{html, redirect, render};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::{templates, urls};

/// Cache key of a rendered index page: one entry per viewer and route.
pub(super) fn index_cache_key(req: &HttpRequest, viewer: Option<i64>) -> String {
    let viewer = viewer.map_or_else(|| "anon".to_string(), |id| format!("user{id}"));
    let route = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.path(), |pq| pq.as_str());
    format!("index_page:{viewer}:{route}")
}

/// GET /
///
/// The rendered page is cached for `index_cache_ttl`.
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let key = index_cache_key(&req, viewer.user_id());
    if let Some(body) = state.cache.get(&key).await {
        tracing::debug!(%key, "Index page cache hit");
        return Ok(html(body));
    }
    tracing::debug!(%key, "Index page cache miss");

    let page = paginate_posts(
        state.posts.as_ref(),
        PostFilter::All,
        &state.paginator,
        query.page.as_deref(),
    )
    .await?;

    let mut context = templates::base_context(viewer.identity());
    context.insert("page", &page);
    let body = templates::render("posts/index.html", &context).map_err(AppError::Template)?;

    if let Err(e) = state
        .cache
        .set(&key, &body, Some(state.index_cache_ttl))
        .await
    {
        tracing::error!(error = %e, %key, "Failed to cache index page");
    }
    Ok(html(body))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = slug.into_inner();
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("Group", &slug))?;

    let page = paginate_posts(
        state.posts.as_ref(),
        PostFilter::Group(group.id),
        &state.paginator,
        query.page.as_deref(),
    )
    .await?;

    let mut context = templates::base_context(viewer.identity());
    context.insert("group", &group);
    context.insert("page", &page);
    render("posts/group_list.html", &context)
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = username.into_inner();
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", &username))?;

    let page = paginate_posts(
        state.posts.as_ref(),
        PostFilter::Author(author.id),
        &state.paginator,
        query.page.as_deref(),
    )
    .await?;
    let following = is_following(state.follows.as_ref(), viewer.user_id(), author.id).await?;

    let mut context = templates::base_context(viewer.identity());
    context.insert("author", &author);
    context.insert("page", &page);
    context.insert("following", &following);
    context.insert("is_self", &(viewer.user_id() == Some(author.id)));
    render("posts/profile.html", &context)
}

async fn find_post(state: &AppState, post_id: i64) -> AppResult<PostDetails> {
    state
        .posts
        .find_details(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id).into())
}

/// Detail page with the comment form, shown blank or with the rejected submission.
async fn detail_page(
    state: &AppState,
    viewer: Option<&Identity>,
    post: PostDetails,
    comment: &CommentFormData,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let posts_count = state
        .posts
        .count(PostFilter::Author(post.author.id))
        .await?;
    let comments = state.comments.list_for_post(post.post.id).await?;
    let can_edit = viewer.is_some_and(|v| post.post.is_authored_by(v.user_id));

    let mut context = templates::base_context(viewer);
    context.insert("title", &post.post.excerpt());
    context.insert("post", &post);
    context.insert("posts_count", &posts_count);
    context.insert("comments", &comments);
    context.insert("can_edit", &can_edit);
    context.insert("form", comment);
    context.insert("errors", errors);
    render("posts/post_detail.html", &context)
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, post_id.into_inner()).await?;
    detail_page(
        &state,
        viewer.identity(),
        post,
        &CommentFormData::default(),
        &FormErrors::new(),
    )
    .await
}

/// Post form page, for a new post (`post_id` = None) or an edit.
fn form_page(
    identity: &Identity,
    groups: &[Group],
    form: &PostFormData,
    errors: &FormErrors,
    post_id: Option<i64>,
) -> AppResult<HttpResponse> {
    let mut context = templates::base_context(Some(identity));
    context.insert("groups", groups);
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("is_edit", &post_id.is_some());
    context.insert("post_id", &post_id);
    render("posts/create_post.html", &context)
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list_all().await?;
    form_page(
        &identity,
        &groups,
        &PostFormData::default(),
        &FormErrors::new(),
        None,
    )
}

/// POST /create/
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    let data = form.into_inner();
    let groups = state.groups.list_all().await?;

    let cleaned = match PostForm::validate(&data.text, &data.group, &data.image, &groups) {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            tracing::debug!(%errors, "Post form rejected");
            return form_page(&identity, &groups, &data, &errors, None);
        }
    };

    let post = state
        .posts
        .save(Post::new(
            identity.user_id,
            cleaned.text,
            cleaned.group_id,
            cleaned.image,
        ))
        .await?;
    tracing::info!(post_id = post.id, author = %identity.username, "Post created");

    Ok(redirect(&urls::profile(&identity.username)))
}

/// Load a post for editing. `Err(redirect)` when the viewer is not its author.
async fn editable_post(
    state: &AppState,
    identity: &Identity,
    post_id: i64,
) -> AppResult<Result<Post, HttpResponse>> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    if post.is_authored_by(identity.user_id) {
        Ok(Ok(post))
    } else {
        tracing::debug!(post_id, user = %identity.username, "Edit by non-author refused");
        Ok(Err(redirect(&urls::post_detail(post_id))))
    }
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = match editable_post(&state, &identity, post_id.into_inner()).await? {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };
    let groups = state.groups.list_all().await?;
    let form = PostFormData {
        text: post.text,
        group: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
        image: post.image.unwrap_or_default(),
    };
    form_page(&identity, &groups, &form, &FormErrors::new(), Some(post.id))
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<i64>,
    form: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    let mut post = match editable_post(&state, &identity, post_id.into_inner()).await? {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };
    let data = form.into_inner();
    let groups = state.groups.list_all().await?;

    let cleaned = match PostForm::validate(&data.text, &data.group, &data.image, &groups) {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            tracing::debug!(post_id = post.id, %errors, "Post form rejected");
            return form_page(&identity, &groups, &data, &errors, Some(post.id));
        }
    };

    post.revise(cleaned.text, cleaned.group_id, cleaned.image);
    let post = state.posts.save(post).await?;
    tracing::info!(post_id = post.id, author = %identity.username, "Post edited");

    Ok(redirect(&urls::post_detail(post.id)))
}

/// POST /posts/{post_id}/comment/
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<i64>,
    form: web::Form<CommentFormData>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, post_id.into_inner()).await?;
    let data = form.into_inner();

    let cleaned = match CommentForm::validate(&data.text) {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return detail_page(&state, Some(&identity), post, &data, &errors).await;
        }
    };

    let comment = state
        .comments
        .save(Comment::new(post.post.id, identity.user_id, cleaned.text))
        .await?;
    tracing::info!(
        comment_id = comment.id,
        post_id = post.post.id,
        author = %identity.username,
        "Comment added"
    );

    Ok(redirect(&urls::post_detail(post.post.id)))
}
