use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::guard::{load_viewable_post, require_owner};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use kinfolio_core::models::{PeerReviewRequest, RequestReviewRequest};
use kinfolio_core::{can_view, AppError};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v0/posts/{id}/review-requests",
    tag = "peer-review",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = RequestReviewRequest,
    responses(
        (status = 201, description = "One request per reviewer; repeats return the existing request", body = Vec<PeerReviewRequest>),
        (status = 400, description = "Author named as their own reviewer", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Post or reviewer not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(operation = "request_reviews", profile_id = %ctx.profile.id))]
pub async fn request_reviews(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(post_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RequestReviewRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (post, author) = load_viewable_post(&state, &ctx.profile, post_id).await?;
    require_owner(post.author_id, &ctx.profile, "post")?;

    let mut seen = HashSet::new();
    let reviewer_ids: Vec<Uuid> = request
        .reviewers
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();

    // Check every reviewer before writing anything.
    for reviewer_id in &reviewer_ids {
        if *reviewer_id == author.id {
            return Err(AppError::InvalidInput(
                "You cannot review your own post".to_string(),
            )
            .into());
        }
        let reviewer = state.db.profiles.get(*reviewer_id).await?;
        match reviewer {
            Some(reviewer) if can_view(&author, &reviewer) => {}
            _ => {
                return Err(AppError::NotFound(format!("Reviewer {} not found", reviewer_id)).into())
            }
        }
    }

    let mut requests = Vec::with_capacity(reviewer_ids.len());
    for reviewer_id in reviewer_ids {
        requests.push(
            state
                .db
                .peer_reviews
                .get_or_create(post.id, author.id, reviewer_id)
                .await?,
        );
    }

    tracing::info!(post_id = %post.id, count = requests.len(), "Peer reviews requested");
    Ok((StatusCode::CREATED, Json(requests)))
}

#[utoipa::path(
    get,
    path = "/api/v0/review-requests/pending",
    tag = "peer-review",
    responses(
        (status = 200, description = "Pending requests addressed to the caller", body = Vec<PeerReviewRequest>)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "pending_reviews", profile_id = %ctx.profile.id))]
pub async fn list_pending_reviews(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let pending = state
        .db
        .peer_reviews
        .list_pending_for_reviewer(ctx.profile.id)
        .await?;
    Ok(Json(pending))
}
