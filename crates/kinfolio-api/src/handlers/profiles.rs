use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::guard::load_viewable_profile;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use kinfolio_core::models::{ProfileResponse, UpdateProfileRequest};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/profiles/me",
    tag = "profiles",
    responses(
        (status = 200, description = "Caller's profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn get_my_profile(ctx: MemberContext) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(ProfileResponse::from(ctx.profile)))
}

#[utoipa::path(
    put,
    path = "/api/v0/profiles/me",
    tag = "profiles",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(operation = "update_profile", profile_id = %ctx.profile.id))]
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let profile = state.db.profiles.update(ctx.profile.id, &request).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    get,
    path = "/api/v0/profiles/{id}",
    tag = "profiles",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "Profile not found or in another family", body = ErrorResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "get_profile", profile_id = %ctx.profile.id))]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let profile = load_viewable_profile(&state, &ctx.profile, id, "Profile").await?;
    Ok(Json(ProfileResponse::from(profile)))
}
