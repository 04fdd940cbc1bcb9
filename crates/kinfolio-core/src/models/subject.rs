use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// School subject a post is filed under
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Subject name must be between 1 and 100 characters"
    ))]
    pub name: String,
}
