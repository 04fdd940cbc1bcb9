use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Role of a member inside a family
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "member_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Student,
    Teacher,
}

impl Display for MemberRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MemberRole::Student => write!(f, "student"),
            MemberRole::Teacher => write!(f, "teacher"),
        }
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(MemberRole::Student),
            "teacher" => Ok(MemberRole::Teacher),
            other => Err(format!("Unknown member role: {}", other)),
        }
    }
}

/// Per-user record carrying family membership and presentation preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MemberProfile {
    pub id: Uuid,
    /// Identity from the token `sub` claim; one profile per user.
    pub user_id: Uuid,
    pub family_id: Option<Uuid>,
    pub display_name: String,
    pub role: MemberRole,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub theme: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberProfile {
    pub fn is_teacher(&self) -> bool {
        self.role == MemberRole::Teacher
    }

    pub fn is_student(&self) -> bool {
        self.role == MemberRole::Student
    }
}

/// Fields used when a profile is created on first sight of a user.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: MemberRole,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub family_id: Option<Uuid>,
    pub display_name: String,
    pub role: MemberRole,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub theme: Option<String>,
}

impl From<MemberProfile> for ProfileResponse {
    fn from(profile: MemberProfile) -> Self {
        ProfileResponse {
            id: profile.id,
            user_id: profile.user_id,
            family_id: profile.family_id,
            display_name: profile.display_name,
            role: profile.role,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
            theme: profile.theme,
        }
    }
}
