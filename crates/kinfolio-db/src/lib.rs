//! Kinfolio Database Layer
//!
//! PostgreSQL repositories for families, profiles and published content.
//! Every repository sits behind an `async_trait` so the API can run against
//! the in-memory implementations in tests.
//!
// Module declarations
pub mod db;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

// Re-exports: repository traits
pub use db::{
    AnnouncementRepositoryTrait, CommentRepositoryTrait, FamilyRepositoryTrait,
    HealthCheckTrait, PeerReviewRepositoryTrait, PostRepositoryTrait,
    PresentationRepositoryTrait, ProfileRepositoryTrait, SubjectRepositoryTrait,
};

// Re-exports: PostgreSQL implementations
pub use db::{
    PostgresAnnouncementRepository, PostgresCommentRepository, PostgresFamilyRepository,
    PostgresHealthCheck, PostgresPeerReviewRepository, PostgresPostRepository,
    PostgresPresentationRepository, PostgresProfileRepository, PostgresSubjectRepository,
};

// Re-exports: helpers
pub use db::family::issue_invite_code;
pub use db::post::{DashboardFilter, PostVisibility};
pub use db::presentation::PresentationDraft;
