use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::guard::require_family;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use kinfolio_core::models::{PostResponse, TimelinePage};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct TimelineQuery {
    /// 1-based page number; out-of-range values clamp to the nearest page
    pub page: Option<i64>,
}

/// Number of pages for `total` items, never less than one.
fn total_pages(total: i64, page_size: i64) -> i64 {
    ((total + page_size - 1) / page_size).max(1)
}

fn clamp_page(requested: Option<i64>, total_pages: i64) -> i64 {
    requested.unwrap_or(1).clamp(1, total_pages)
}

#[utoipa::path(
    get,
    path = "/api/v0/timeline",
    tag = "timeline",
    params(TimelineQuery),
    responses(
        (status = 200, description = "Published posts of the caller's family, newest first", body = TimelinePage),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "timeline", profile_id = %ctx.profile.id))]
pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Query(query): Query<TimelineQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let family_id = require_family(&ctx.profile)?;
    let page_size = state.config.timeline_page_size;

    let total_posts = state.db.posts.count_family_timeline(family_id).await?;
    let total_pages = total_pages(total_posts, page_size);
    let page = clamp_page(query.page, total_pages);

    let posts = state
        .db
        .posts
        .list_family_timeline(family_id, page_size, (page - 1) * page_size)
        .await?;

    Ok(Json(TimelinePage {
        page,
        total_pages,
        total_posts,
        posts: posts.into_iter().map(PostResponse::from).collect(),
    }))
}
