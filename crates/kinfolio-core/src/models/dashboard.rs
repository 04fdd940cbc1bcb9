use serde::Serialize;
use utoipa::ToSchema;

use super::{ProfileResponse, SubjectSection};
use crate::dashboard::SubjectShare;
use crate::heatmap::Heatmap;

/// Teacher overview of the family's student posts.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub total_posts: u64,
    pub subject_distribution: Vec<SubjectShare>,
    pub students: Vec<ProfileResponse>,
    pub selected_student: Option<ProfileResponse>,
    pub search_query: Option<String>,
    pub heatmap: Heatmap,
    /// Newest first inside each subject.
    pub subject_posts: Vec<SubjectSection>,
}
