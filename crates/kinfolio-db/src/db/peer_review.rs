use kinfolio_core::models::PeerReviewRequest;
use kinfolio_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const REVIEW_COLUMNS: &str = "id, post_id, requester_id, reviewer_id, status, created_at";

#[async_trait::async_trait]
pub trait PeerReviewRepositoryTrait: Send + Sync {
    /// One request per (post, reviewer); repeating a request returns the existing row.
    async fn get_or_create(
        &self,
        post_id: Uuid,
        requester_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<PeerReviewRequest, AppError>;

    /// Mark the reviewer's pending request on the post completed; returns rows changed.
    async fn complete_for_reviewer(&self, post_id: Uuid, reviewer_id: Uuid)
        -> Result<u64, AppError>;

    /// Pending requests addressed to `reviewer_id`, newest first.
    async fn list_pending_for_reviewer(
        &self,
        reviewer_id: Uuid,
    ) -> Result<Vec<PeerReviewRequest>, AppError>;
}

#[derive(Clone)]
pub struct PostgresPeerReviewRepository {
    pool: PgPool,
}

impl PostgresPeerReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PeerReviewRepositoryTrait for PostgresPeerReviewRepository {
    #[tracing::instrument(skip(self), fields(db.table = "peer_review_requests", db.operation = "upsert"))]
    async fn get_or_create(
        &self,
        post_id: Uuid,
        requester_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<PeerReviewRequest, AppError> {
        let request = sqlx::query_as::<Postgres, PeerReviewRequest>(&format!(
            r#"
            INSERT INTO peer_review_requests (post_id, requester_id, reviewer_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, reviewer_id) DO UPDATE SET post_id = EXCLUDED.post_id
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(post_id)
        .bind(requester_id)
        .bind(reviewer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    #[tracing::instrument(skip(self), fields(db.table = "peer_review_requests", db.operation = "update"))]
    async fn complete_for_reviewer(
        &self,
        post_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE peer_review_requests
            SET status = 'completed'
            WHERE post_id = $1 AND reviewer_id = $2 AND status = 'pending'
            "#,
        )
        .bind(post_id)
        .bind(reviewer_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "peer_review_requests", db.operation = "select"))]
    async fn list_pending_for_reviewer(
        &self,
        reviewer_id: Uuid,
    ) -> Result<Vec<PeerReviewRequest>, AppError> {
        let requests = sqlx::query_as::<Postgres, PeerReviewRequest>(&format!(
            r#"
            SELECT {} FROM peer_review_requests
            WHERE reviewer_id = $1 AND status = 'pending'
            ORDER BY created_at DESC, id DESC
            "#,
            REVIEW_COLUMNS
        ))
        .bind(reviewer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
