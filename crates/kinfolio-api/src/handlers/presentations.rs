//! Presentations and portfolios: ordered selections of an author's own posts.

use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::guard::{load_viewable_profile, require_owner};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use kinfolio_core::models::{
    MemberProfile, PostResponse, PostStatus, Presentation, PresentationDetailResponse,
    PresentationInput, SubjectSection,
};
use kinfolio_core::AppError;
use kinfolio_db::PresentationDraft;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Every listed post must exist, be written by `author_id`, and appear once.
async fn check_post_selection(
    state: &AppState,
    author_id: Uuid,
    post_ids: &[Uuid],
) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(post_ids.len());
    for post_id in post_ids {
        if !seen.insert(*post_id) {
            return Err(AppError::InvalidInput(format!(
                "Post {} is listed more than once",
                post_id
            )));
        }
        match state.db.posts.get(*post_id).await? {
            Some(post) if post.author_id == author_id => {}
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "Post {} is not one of your posts",
                    post_id
                )))
            }
        }
    }
    Ok(())
}

fn draft_of(input: &PresentationInput) -> PresentationDraft<'_> {
    PresentationDraft {
        kind: input.kind,
        title: input.title.trim(),
        description: input.description.as_deref(),
        post_ids: &input.posts,
    }
}

async fn detail_response(
    state: &AppState,
    presentation: Presentation,
    viewer: &MemberProfile,
) -> Result<PresentationDetailResponse, AppError> {
    let is_author = presentation.author_id == viewer.id;
    let posts = state
        .db
        .presentations
        .list_posts(presentation.id)
        .await?
        .into_iter()
        .filter(|post| is_author || post.status == PostStatus::Published)
        .map(PostResponse::from)
        .collect();

    Ok(PresentationDetailResponse {
        author_id: presentation.author_id,
        presentation: presentation.into(),
        sections: SubjectSection::group(posts),
    })
}

async fn load_presentation(state: &AppState, id: Uuid) -> Result<Presentation, AppError> {
    state
        .db
        .presentations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Presentation not found".to_string()))
}

/// Load a presentation the caller may see; cross-family ids read as missing.
async fn load_viewable_presentation(
    state: &AppState,
    viewer: &MemberProfile,
    id: Uuid,
) -> Result<Presentation, AppError> {
    let presentation = load_presentation(state, id).await?;
    load_viewable_profile(state, viewer, presentation.author_id, "Presentation").await?;
    Ok(presentation)
}

#[utoipa::path(
    post,
    path = "/api/v0/presentations",
    tag = "presentations",
    request_body = PresentationInput,
    responses(
        (status = 201, description = "Presentation created", body = PresentationDetailResponse),
        (status = 400, description = "Invalid input or a post that is not the caller's", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, input), fields(operation = "create_presentation", profile_id = %ctx.profile.id))]
pub async fn create_presentation(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    ValidatedJson(input): ValidatedJson<PresentationInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    check_post_selection(&state, ctx.profile.id, &input.posts).await?;

    let presentation = state
        .db
        .presentations
        .create(ctx.profile.id, draft_of(&input))
        .await?;
    tracing::info!(presentation_id = %presentation.id, kind = ?presentation.kind, "Presentation created");

    let response = detail_response(&state, presentation, &ctx.profile).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v0/presentations/{id}",
    tag = "presentations",
    params(("id" = Uuid, Path, description = "Presentation ID")),
    responses(
        (status = 200, description = "Presentation with posts grouped by subject", body = PresentationDetailResponse),
        (status = 404, description = "Presentation not found or in another family", body = ErrorResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "get_presentation", profile_id = %ctx.profile.id))]
pub async fn get_presentation(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let presentation = load_viewable_presentation(&state, &ctx.profile, id).await?;
    Ok(Json(detail_response(&state, presentation, &ctx.profile).await?))
}

#[utoipa::path(
    put,
    path = "/api/v0/presentations/{id}",
    tag = "presentations",
    params(("id" = Uuid, Path, description = "Presentation ID")),
    request_body = PresentationInput,
    responses(
        (status = 200, description = "Presentation replaced", body = PresentationDetailResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Presentation not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, input), fields(operation = "update_presentation", profile_id = %ctx.profile.id))]
pub async fn update_presentation(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<PresentationInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let presentation = load_viewable_presentation(&state, &ctx.profile, id).await?;
    require_owner(presentation.author_id, &ctx.profile, "presentation")?;
    check_post_selection(&state, ctx.profile.id, &input.posts).await?;

    let presentation = state
        .db
        .presentations
        .update(presentation.id, draft_of(&input))
        .await?;
    Ok(Json(detail_response(&state, presentation, &ctx.profile).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v0/presentations/{id}",
    tag = "presentations",
    params(("id" = Uuid, Path, description = "Presentation ID")),
    responses(
        (status = 204, description = "Presentation deleted"),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Presentation not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "delete_presentation", profile_id = %ctx.profile.id))]
pub async fn delete_presentation(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let presentation = load_viewable_presentation(&state, &ctx.profile, id).await?;
    require_owner(presentation.author_id, &ctx.profile, "presentation")?;

    if !state.db.presentations.delete(presentation.id).await? {
        return Err(AppError::NotFound("Presentation not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
