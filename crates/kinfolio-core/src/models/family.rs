use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::ProfileResponse;

/// Family (classroom or household) entity: the isolation boundary for content.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Family {
    pub id: Uuid,
    pub name: String,
    /// At most one active code per family; `None` until the first one is issued.
    pub invite_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a constrained invite-code write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteCodeWrite {
    Assigned,
    /// The unique index rejected the code; generate another one.
    Collision,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateFamilyRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Family name must be between 1 and 100 characters"
    ))]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinFamilyRequest {
    #[validate(length(min = 1, max = 32, message = "Invite codes look like ABC-123"))]
    pub invite_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FamilyResponse {
    pub id: Uuid,
    pub name: String,
    pub invite_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub members: Vec<ProfileResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InviteCodeResponse {
    pub family_id: Uuid,
    pub invite_code: String,
}
