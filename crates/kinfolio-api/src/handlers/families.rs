//! Family membership: create, join by invite code, leave, and code rotation.

use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::guard::{require_family, require_teacher};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use kinfolio_core::models::{
    CreateFamilyRequest, Family, FamilyResponse, InviteCodeResponse, JoinFamilyRequest,
    MemberProfile, ProfileResponse,
};
use kinfolio_core::{normalize_invite_code, AppError};
use kinfolio_db::issue_invite_code;
use std::sync::Arc;

async fn family_response(state: &AppState, family: Family) -> Result<FamilyResponse, AppError> {
    let members = state
        .db
        .profiles
        .list_family_members(family.id, None)
        .await?
        .into_iter()
        .map(ProfileResponse::from)
        .collect();

    Ok(FamilyResponse {
        id: family.id,
        name: family.name,
        invite_code: family.invite_code,
        created_at: family.created_at,
        members,
    })
}

/// Create a family with a fresh invite code and move `profile` into it.
async fn found_family(
    state: &AppState,
    profile: &MemberProfile,
    name: &str,
) -> Result<(Family, MemberProfile), AppError> {
    let mut family = state.db.families.create(name).await?;
    let code = issue_invite_code(
        state.db.families.as_ref(),
        family.id,
        state.config.invite_code_max_attempts,
    )
    .await?;
    family.invite_code = Some(code);

    let profile = state
        .db
        .profiles
        .set_family(profile.id, Some(family.id))
        .await?;

    tracing::info!(family_id = %family.id, profile_id = %profile.id, "Family created");
    Ok((family, profile))
}

/// The caller's profile, placed in a new family of its own if it has none.
///
/// Used when a member publishes before joining anyone.
pub(crate) async fn ensure_family(
    state: &AppState,
    profile: MemberProfile,
) -> Result<MemberProfile, AppError> {
    if profile.family_id.is_some() {
        return Ok(profile);
    }
    let name = format!("{}'s Family", profile.display_name);
    let (_, profile) = found_family(state, &profile, &name).await?;
    Ok(profile)
}

#[utoipa::path(
    post,
    path = "/api/v0/families",
    tag = "families",
    request_body = CreateFamilyRequest,
    responses(
        (status = 201, description = "Family created and joined", body = FamilyResponse),
        (status = 409, description = "Caller already belongs to a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(operation = "create_family", profile_id = %ctx.profile.id))]
pub async fn create_family(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    ValidatedJson(request): ValidatedJson<CreateFamilyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if ctx.profile.family_id.is_some() {
        return Err(AppError::Conflict(
            "Leave your current family before creating a new one".to_string(),
        )
        .into());
    }

    let (family, _) = found_family(&state, &ctx.profile, request.name.trim()).await?;
    let response = family_response(&state, family).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v0/families/me",
    tag = "families",
    responses(
        (status = 200, description = "Caller's family with members", body = FamilyResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "get_family", profile_id = %ctx.profile.id))]
pub async fn get_my_family(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let family_id = require_family(&ctx.profile)?;
    let family = state
        .db
        .families
        .get(family_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Family not found".to_string()))?;

    Ok(Json(family_response(&state, family).await?))
}

#[utoipa::path(
    post,
    path = "/api/v0/families/join",
    tag = "families",
    request_body = JoinFamilyRequest,
    responses(
        (status = 200, description = "Joined the family", body = FamilyResponse),
        (status = 400, description = "Malformed invite code", body = ErrorResponse),
        (status = 404, description = "No family holds this code", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(operation = "join_family", profile_id = %ctx.profile.id))]
pub async fn join_family(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    ValidatedJson(request): ValidatedJson<JoinFamilyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let code = normalize_invite_code(&request.invite_code).ok_or_else(|| {
        AppError::InvalidInput("Invite codes look like ABC-123".to_string())
    })?;

    let family = state
        .db
        .families
        .find_by_invite_code(&code)
        .await?
        .ok_or_else(|| AppError::NotFound("Invite code not found".to_string()))?;

    state
        .db
        .profiles
        .set_family(ctx.profile.id, Some(family.id))
        .await?;
    tracing::info!(family_id = %family.id, "Joined family by invite code");

    Ok(Json(family_response(&state, family).await?))
}

#[utoipa::path(
    post,
    path = "/api/v0/families/me/invite-code",
    tag = "families",
    responses(
        (status = 200, description = "New invite code; the previous one stops working", body = InviteCodeResponse),
        (status = 403, description = "Caller is not a teacher", body = ErrorResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "regenerate_invite_code", profile_id = %ctx.profile.id))]
pub async fn regenerate_invite_code(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
) -> Result<impl IntoResponse, HttpAppError> {
    require_teacher(&ctx.profile)?;
    let family_id = require_family(&ctx.profile)?;

    let invite_code = issue_invite_code(
        state.db.families.as_ref(),
        family_id,
        state.config.invite_code_max_attempts,
    )
    .await?;

    Ok(Json(InviteCodeResponse {
        family_id,
        invite_code,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v0/families/leave",
    tag = "families",
    responses(
        (status = 200, description = "Left the family", body = ProfileResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "leave_family", profile_id = %ctx.profile.id))]
pub async fn leave_family(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let family_id = require_family(&ctx.profile)?;
    let profile = state.db.profiles.set_family(ctx.profile.id, None).await?;
    tracing::info!(family_id = %family_id, "Left family");
    Ok(Json(ProfileResponse::from(profile)))
}
