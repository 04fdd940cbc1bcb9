use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::guard::require_teacher;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use kinfolio_core::models::{CreateSubjectRequest, Subject};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/v0/subjects",
    tag = "subjects",
    responses(
        (status = 200, description = "All subjects by name", body = Vec<Subject>)
    )
)]
pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
    _ctx: MemberContext,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.subjects.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/v0/subjects",
    tag = "subjects",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 403, description = "Caller is not a teacher", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(operation = "create_subject", profile_id = %ctx.profile.id))]
pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    ValidatedJson(request): ValidatedJson<CreateSubjectRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_teacher(&ctx.profile)?;
    let subject = state.db.subjects.create(request.name.trim()).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}
