use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::guard::{require_family, require_teacher};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use kinfolio_core::models::{Announcement, CreateAnnouncementRequest};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v0/announcements",
    tag = "announcements",
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 201, description = "Announcement posted to the caller's family", body = Announcement),
        (status = 403, description = "Caller is not a teacher", body = ErrorResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(operation = "create_announcement", profile_id = %ctx.profile.id))]
pub async fn create_announcement(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    ValidatedJson(request): ValidatedJson<CreateAnnouncementRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_teacher(&ctx.profile)?;
    let family_id = require_family(&ctx.profile)?;

    let announcement = state
        .db
        .announcements
        .create(family_id, ctx.profile.id, request.title.trim(), &request.body)
        .await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

#[utoipa::path(
    get,
    path = "/api/v0/announcements",
    tag = "announcements",
    responses(
        (status = 200, description = "Family announcements, newest first", body = Vec<Announcement>),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "list_announcements", profile_id = %ctx.profile.id))]
pub async fn list_announcements(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let family_id = require_family(&ctx.profile)?;
    Ok(Json(state.db.announcements.list_for_family(family_id).await?))
}
