//! Teacher dashboard over the family's student posts.

use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::guard::{require_family, require_teacher};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use kinfolio_core::models::{
    DashboardResponse, MemberRole, PostResponse, ProfileResponse, SubjectSection,
};
use kinfolio_core::{subject_distribution, AppError, HeatmapBuilder};
use kinfolio_db::DashboardFilter;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Restrict to one student of the family
    pub student: Option<Uuid>,
    /// Case-insensitive search in titles and video descriptions
    pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v0/dashboard",
    tag = "dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Post statistics for the family's students", body = DashboardResponse),
        (status = 403, description = "Caller is not a teacher", body = ErrorResponse),
        (status = 404, description = "Student not in the caller's family", body = ErrorResponse),
        (status = 409, description = "Caller has not joined a family", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(operation = "dashboard", profile_id = %ctx.profile.id))]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    ctx: MemberContext,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_teacher(&ctx.profile)?;
    let family_id = require_family(&ctx.profile)?;

    let students = state
        .db
        .profiles
        .list_family_members(family_id, Some(MemberRole::Student))
        .await?;

    let selected_student = match query.student {
        Some(student_id) => Some(
            students
                .iter()
                .find(|s| s.id == student_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?,
        ),
        None => None,
    };

    let search_query = query
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    let filter = DashboardFilter {
        student_id: query.student,
        query: search_query.clone(),
    };
    let posts = state.db.posts.list_for_dashboard(family_id, &filter).await?;

    let builder = HeatmapBuilder::new(state.config.time_zone);
    let heatmap = builder.build(posts.iter().map(|p| p.created_at), builder.today());
    let distribution = subject_distribution(posts.iter().map(|p| p.subject_name.as_str()));
    let total_posts = posts.len() as u64;

    tracing::debug!(family_id = %family_id, total_posts, "Dashboard computed");

    Ok(Json(DashboardResponse {
        total_posts,
        subject_distribution: distribution,
        students: students.into_iter().map(ProfileResponse::from).collect(),
        selected_student: selected_student.map(ProfileResponse::from),
        search_query,
        heatmap,
        subject_posts: SubjectSection::group(posts.into_iter().map(PostResponse::from).collect()),
    }))
}
