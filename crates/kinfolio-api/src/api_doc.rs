//! OpenAPI documentation.
//! Served at `constants::OPENAPI_JSON_PATH` and rendered by RapiDoc under `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use kinfolio_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kinfolio API",
        version = "0.1.0",
        description = "Classroom and family publishing API (v0): journals, photo/audio/video posts, comments and peer review, presentations, teacher dashboards and activity heatmaps. Content is visible only inside the author's family. All endpoints are versioned under /api/v0/ and expect a bearer JWT."
    ),
    paths(
        // Profiles
        handlers::profiles::get_my_profile,
        handlers::profiles::update_my_profile,
        handlers::profiles::get_profile,
        // Families
        handlers::families::create_family,
        handlers::families::get_my_family,
        handlers::families::join_family,
        handlers::families::regenerate_invite_code,
        handlers::families::leave_family,
        // Subjects
        handlers::subjects::list_subjects,
        handlers::subjects::create_subject,
        // Posts
        handlers::posts::create_post,
        handlers::posts::get_post,
        handlers::posts::update_post,
        handlers::posts::delete_post,
        handlers::posts::list_author_posts,
        handlers::posts::get_author_heatmap,
        handlers::timeline::get_timeline,
        // Comments and peer review
        handlers::comments::create_comment,
        handlers::peer_reviews::request_reviews,
        handlers::peer_reviews::list_pending_reviews,
        // Presentations
        handlers::presentations::create_presentation,
        handlers::presentations::get_presentation,
        handlers::presentations::update_presentation,
        handlers::presentations::delete_presentation,
        // Announcements
        handlers::announcements::create_announcement,
        handlers::announcements::list_announcements,
        // Dashboard
        handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            error::ErrorResponse,
            models::MemberRole,
            models::ProfileResponse,
            models::UpdateProfileRequest,
            models::CreateFamilyRequest,
            models::JoinFamilyRequest,
            models::FamilyResponse,
            models::InviteCodeResponse,
            models::Subject,
            models::CreateSubjectRequest,
            models::PostStatus,
            models::PostInput,
            models::PostResponse,
            models::PostDetailResponse,
            models::AuthorPostsResponse,
            models::TimelinePage,
            models::CommentResponse,
            models::CreateCommentRequest,
            models::ReviewStatus,
            models::PeerReviewRequest,
            models::RequestReviewRequest,
            models::PresentationKind,
            models::PresentationInput,
            models::PresentationSummary,
            models::PresentationDetailResponse,
            models::SubjectSection,
            models::Announcement,
            models::CreateAnnouncementRequest,
            models::DashboardResponse,
            kinfolio_core::SubjectShare,
            kinfolio_core::Heatmap,
            kinfolio_core::HeatmapCell,
            kinfolio_core::HeatmapSummary,
            kinfolio_core::MonthLabel,
        )
    ),
    tags(
        (name = "profiles", description = "Member profiles"),
        (name = "families", description = "Family membership and invite codes"),
        (name = "subjects", description = "School subjects"),
        (name = "posts", description = "Posts, author pages and heatmaps"),
        (name = "timeline", description = "Family timeline"),
        (name = "comments", description = "Comments and teacher feedback"),
        (name = "peer-review", description = "Peer review requests"),
        (name = "presentations", description = "Presentations and portfolios"),
        (name = "announcements", description = "Teacher announcements"),
        (name = "dashboard", description = "Teacher dashboard")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_versioned_paths() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/v0/timeline"));
        assert!(spec.paths.paths.contains_key("/api/v0/posts/{id}"));
        assert!(spec.paths.paths.keys().all(|p| p.starts_with(crate::constants::API_PREFIX)));
    }
}
