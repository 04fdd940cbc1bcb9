use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "review_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Completed,
}

/// A request from a post's author asking a classmate to review it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PeerReviewRequest {
    pub id: Uuid,
    pub post_id: Uuid,
    pub requester_id: Uuid,
    pub reviewer_id: Uuid,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RequestReviewRequest {
    /// Profile ids of the requested reviewers
    #[validate(length(min = 1, max = 50, message = "Name between 1 and 50 reviewers"))]
    pub reviewers: Vec<Uuid>,
}
