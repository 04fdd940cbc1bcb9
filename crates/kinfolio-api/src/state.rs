//! Application state.
//!
//! Repositories are held as trait objects so the same router runs over
//! PostgreSQL in production and over the in-memory tables in tests.

use crate::auth::JwtService;
use kinfolio_core::Config;
use kinfolio_db::{
    AnnouncementRepositoryTrait, CommentRepositoryTrait, FamilyRepositoryTrait,
    HealthCheckTrait, PeerReviewRepositoryTrait, PostRepositoryTrait,
    PostgresAnnouncementRepository, PostgresCommentRepository, PostgresFamilyRepository,
    PostgresHealthCheck, PostgresPeerReviewRepository, PostgresPostRepository,
    PostgresPresentationRepository, PostgresProfileRepository, PostgresSubjectRepository,
    PresentationRepositoryTrait, ProfileRepositoryTrait, SubjectRepositoryTrait,
};
use sqlx::PgPool;
use std::sync::Arc;

/// All repositories used by the handlers.
#[derive(Clone)]
pub struct DbState {
    pub families: Arc<dyn FamilyRepositoryTrait>,
    pub profiles: Arc<dyn ProfileRepositoryTrait>,
    pub subjects: Arc<dyn SubjectRepositoryTrait>,
    pub posts: Arc<dyn PostRepositoryTrait>,
    pub comments: Arc<dyn CommentRepositoryTrait>,
    pub peer_reviews: Arc<dyn PeerReviewRepositoryTrait>,
    pub presentations: Arc<dyn PresentationRepositoryTrait>,
    pub announcements: Arc<dyn AnnouncementRepositoryTrait>,
    pub health: Arc<dyn HealthCheckTrait>,
}

impl DbState {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            families: Arc::new(PostgresFamilyRepository::new(pool.clone())),
            profiles: Arc::new(PostgresProfileRepository::new(pool.clone())),
            subjects: Arc::new(PostgresSubjectRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            peer_reviews: Arc::new(PostgresPeerReviewRepository::new(pool.clone())),
            presentations: Arc::new(PostgresPresentationRepository::new(pool.clone())),
            announcements: Arc::new(PostgresAnnouncementRepository::new(pool.clone())),
            health: Arc::new(PostgresHealthCheck::new(pool)),
        }
    }

    /// One backend serving every repository (the in-memory test database).
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: FamilyRepositoryTrait
            + ProfileRepositoryTrait
            + SubjectRepositoryTrait
            + PostRepositoryTrait
            + CommentRepositoryTrait
            + PeerReviewRepositoryTrait
            + PresentationRepositoryTrait
            + AnnouncementRepositoryTrait
            + HealthCheckTrait
            + 'static,
    {
        Self {
            families: backend.clone(),
            profiles: backend.clone(),
            subjects: backend.clone(),
            posts: backend.clone(),
            comments: backend.clone(),
            peer_reviews: backend.clone(),
            presentations: backend.clone(),
            announcements: backend.clone(),
            health: backend,
        }
    }
}

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jwt: JwtService,
    pub db: DbState,
}

impl AppState {
    pub fn new(config: Config, db: DbState) -> Self {
        let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiry_hours);
        Self { config, jwt, db }
    }
}
