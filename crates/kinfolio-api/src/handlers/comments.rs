use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::guard::load_viewable_post;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use kinfolio_core::models::{CommentResponse, CreateCommentRequest};
use kinfolio_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v0/posts/{id}/comments",
    tag = "comments",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 404, description = "Post not found or in another family", body = ErrorResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(operation = "create_comment", profile_id = %ctx.profile.id))]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(post_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (post, _) = load_viewable_post(&state, &ctx.profile, post_id).await?;
    if request.body.trim().is_empty() {
        return Err(AppError::InvalidInput("Comment cannot be blank".to_string()).into());
    }

    let is_feedback = ctx.profile.is_teacher();
    let comment = state
        .db
        .comments
        .create(post.id, ctx.profile.id, request.body.trim(), is_feedback)
        .await?;

    // A student's comment answers any review they were asked for on this post.
    if ctx.profile.is_student() {
        let completed = state
            .db
            .peer_reviews
            .complete_for_reviewer(post.id, ctx.profile.id)
            .await?;
        if completed > 0 {
            tracing::info!(post_id = %post.id, "Peer review completed");
        }
    }

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}
