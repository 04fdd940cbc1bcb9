use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::PostResponse;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "presentation_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PresentationKind {
    #[default]
    Presentation,
    Portfolio,
}

/// Ordered collection of an author's own posts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Presentation {
    pub id: Uuid,
    pub author_id: Uuid,
    pub kind: PresentationKind,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PresentationInput {
    #[serde(default)]
    pub kind: PresentationKind,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// Post ids in display order
    #[validate(length(max = 500))]
    pub posts: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PresentationSummary {
    pub id: Uuid,
    pub kind: PresentationKind,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Presentation> for PresentationSummary {
    fn from(presentation: Presentation) -> Self {
        PresentationSummary {
            id: presentation.id,
            kind: presentation.kind,
            title: presentation.title,
            description: presentation.description,
            created_at: presentation.created_at,
        }
    }
}

/// Posts of one subject, in the order they were given
#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectSection {
    pub subject: String,
    pub posts: Vec<PostResponse>,
}

impl SubjectSection {
    /// Group posts by subject name (ascending), keeping input order inside each group.
    pub fn group(posts: Vec<PostResponse>) -> Vec<SubjectSection> {
        let mut groups: BTreeMap<String, Vec<PostResponse>> = BTreeMap::new();
        for post in posts {
            groups.entry(post.subject_name.clone()).or_default().push(post);
        }
        groups
            .into_iter()
            .map(|(subject, posts)| SubjectSection { subject, posts })
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PresentationDetailResponse {
    #[serde(flatten)]
    pub presentation: PresentationSummary,
    pub author_id: Uuid,
    pub sections: Vec<SubjectSection>,
}
