//! Post CRUD and the per-author views (archive page and activity heatmap).

use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::families::ensure_family;
use crate::handlers::guard::{load_viewable_post, load_viewable_profile, require_owner};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Datelike;
use kinfolio_core::models::{
    AuthorPostsResponse, CommentResponse, PostDetailResponse, PostInput, PostResponse,
    PresentationSummary,
};
use kinfolio_core::{archive_years, year_bounds, AppError, Heatmap, HeatmapBuilder};
use kinfolio_db::PostVisibility;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct AuthorPostsQuery {
    /// Only posts created in this calendar year (service time zone)
    pub year: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/v0/posts",
    tag = "posts",
    request_body = PostInput,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid input or unknown subject", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, input), fields(operation = "create_post", profile_id = %ctx.profile.id))]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    ValidatedJson(input): ValidatedJson<PostInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let author = ensure_family(&state, ctx.profile).await?;
    let post = state.db.posts.create(author.id, &input).await?;
    tracing::info!(post_id = %post.id, subject = %post.subject_name, "Post created");
    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

#[utoipa::path(
    get,
    path = "/api/v0/posts/{id}",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with comments", body = PostDetailResponse),
        (status = 404, description = "Post not found or in another family", body = ErrorResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "get_post", profile_id = %ctx.profile.id))]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (mut post, _author) = load_viewable_post(&state, &ctx.profile, id).await?;
    post.view_count = state.db.posts.increment_view_count(post.id).await?;

    let comments = state
        .db
        .comments
        .list_for_post(post.id)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();

    Ok(Json(PostDetailResponse {
        post: post.into(),
        comments,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v0/posts/{id}",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = PostInput,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, input), fields(operation = "update_post", profile_id = %ctx.profile.id))]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<PostInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (post, _) = load_viewable_post(&state, &ctx.profile, id).await?;
    require_owner(post.author_id, &ctx.profile, "post")?;

    let post = state.db.posts.update(post.id, &input).await?;
    Ok(Json(PostResponse::from(post)))
}

#[utoipa::path(
    delete,
    path = "/api/v0/posts/{id}",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "delete_post", profile_id = %ctx.profile.id))]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (post, _) = load_viewable_post(&state, &ctx.profile, id).await?;
    require_owner(post.author_id, &ctx.profile, "post")?;

    if !state.db.posts.delete(post.id).await? {
        return Err(AppError::NotFound("Post not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v0/authors/{id}/posts",
    tag = "posts",
    params(
        ("id" = Uuid, Path, description = "Author profile ID"),
        AuthorPostsQuery
    ),
    responses(
        (status = 200, description = "Author page", body = AuthorPostsResponse),
        (status = 404, description = "Author not found or in another family", body = ErrorResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "list_author_posts", profile_id = %ctx.profile.id))]
pub async fn list_author_posts(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(author_id): Path<Uuid>,
    Query(query): Query<AuthorPostsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let author = load_viewable_profile(&state, &ctx.profile, author_id, "Author").await?;
    let visibility = PostVisibility::for_reader(author.id, ctx.profile.id);
    let time_zone = state.config.time_zone;

    let created_between = match query.year {
        Some(year) => Some(
            year_bounds(time_zone, year)
                .ok_or_else(|| AppError::InvalidInput(format!("Year {} is out of range", year)))?,
        ),
        None => None,
    };

    let posts = state
        .db
        .posts
        .list_by_author(author.id, visibility, created_between)
        .await?;
    let timestamps = state
        .db
        .posts
        .list_author_timestamps(author.id, visibility)
        .await?;
    let presentations = state.db.presentations.list_by_author(author.id).await?;
    let pending_reviews = state
        .db
        .peer_reviews
        .list_pending_for_reviewer(author.id)
        .await?;

    Ok(Json(AuthorPostsResponse {
        author_id: author.id,
        display_name: author.display_name,
        posts: posts.into_iter().map(PostResponse::from).collect(),
        archive_years: archive_years(timestamps, time_zone),
        selected_year: query.year,
        current_year: HeatmapBuilder::new(time_zone).today().year(),
        presentations: presentations
            .into_iter()
            .map(PresentationSummary::from)
            .collect(),
        pending_reviews,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v0/authors/{id}/heatmap",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Author profile ID")),
    responses(
        (status = 200, description = "Activity over the last year ending today", body = Heatmap),
        (status = 404, description = "Author not found or in another family", body = ErrorResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "author_heatmap", profile_id = %ctx.profile.id))]
pub async fn get_author_heatmap(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(author_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let author = load_viewable_profile(&state, &ctx.profile, author_id, "Author").await?;
    let visibility = PostVisibility::for_reader(author.id, ctx.profile.id);

    let timestamps = state
        .db
        .posts
        .list_author_timestamps(author.id, visibility)
        .await?;

    let builder = HeatmapBuilder::new(state.config.time_zone);
    let heatmap = builder.build(timestamps, builder.today());
    Ok(Json(heatmap))
}
