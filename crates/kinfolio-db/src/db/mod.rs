//! Database repositories for data access layer
//!
//! One repository per entity. Each exposes an `async_trait` contract
//! (`...RepositoryTrait`) and a PostgreSQL implementation (`Postgres...`).
//! Cross-entity joins (subject names on posts, author names on comments)
//! are done in SQL so callers receive ready-to-render rows.

pub mod announcement;
pub mod comment;
pub mod family;
pub mod health;
pub mod peer_review;
pub mod post;
pub mod presentation;
pub mod profile;
pub mod subject;

pub use announcement::{AnnouncementRepositoryTrait, PostgresAnnouncementRepository};
pub use comment::{CommentRepositoryTrait, PostgresCommentRepository};
pub use family::{FamilyRepositoryTrait, PostgresFamilyRepository};
pub use health::{HealthCheckTrait, PostgresHealthCheck};
pub use peer_review::{PeerReviewRepositoryTrait, PostgresPeerReviewRepository};
pub use post::{PostRepositoryTrait, PostgresPostRepository};
pub use presentation::{
    PostgresPresentationRepository, PresentationDraft, PresentationRepositoryTrait,
};
pub use profile::{PostgresProfileRepository, ProfileRepositoryTrait};
pub use subject::{PostgresSubjectRepository, SubjectRepositoryTrait};

/// Whether a sqlx error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

/// Whether a sqlx error is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_foreign_key_violation())
        .unwrap_or(false)
}
