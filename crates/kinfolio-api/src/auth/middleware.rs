use crate::auth::jwt::JwtService;
use crate::auth::models::MemberContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use kinfolio_core::models::NewProfile;
use kinfolio_core::AppError;
use kinfolio_db::ProfileRepositoryTrait;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
    pub profiles: Arc<dyn ProfileRepositoryTrait>,
}

/// Verify the bearer token and attach the caller's profile as [`MemberContext`].
///
/// The profile is created on first sight of a user, from the token's name and role.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    let claims = match auth_state.jwt.verify(token) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    let profile = match auth_state
        .profiles
        .get_or_create(NewProfile {
            user_id: claims.sub,
            display_name: claims.name,
            role: claims.role,
        })
        .await
    {
        Ok(profile) => profile,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::debug!(
        user_id = %profile.user_id,
        profile_id = %profile.id,
        role = %profile.role,
        "Authenticated request"
    );

    request.extensions_mut().insert(MemberContext { profile });
    next.run(request).await
}
