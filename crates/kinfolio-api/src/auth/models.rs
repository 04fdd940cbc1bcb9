use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use kinfolio_core::models::{MemberProfile, MemberRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub name: String,
    pub role: MemberRole,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Authenticated member, stored in request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct MemberContext {
    pub profile: MemberProfile,
}

impl<S> FromRequestParts<S> for MemberContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<MemberContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "Missing member context".to_string(),
                        details: None,
                        error_type: None,
                        code: "MISSING_MEMBER_CONTEXT".to_string(),
                        recoverable: false,
                        suggested_action: Some("Check the authentication token".to_string()),
                    }),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_role_is_lowercase_on_the_wire() {
        let claims = JwtClaims {
            sub: Uuid::nil(),
            name: "Ms. Rivera".to_string(),
            role: MemberRole::Teacher,
            exp: 10,
            iat: 0,
        };
        let json = serde_json::to_value(&claims).expect("serialize");
        assert_eq!(json["role"], "teacher");

        let parsed: JwtClaims = serde_json::from_value(serde_json::json!({
            "sub": Uuid::nil(),
            "name": "Ada",
            "role": "student",
            "exp": 10,
            "iat": 0
        }))
        .expect("deserialize");
        assert_eq!(parsed.role, MemberRole::Student);
    }
}
