use kinfolio_core::models::Comment;
use kinfolio_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait CommentRepositoryTrait: Send + Sync {
    async fn create(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        body: &str,
        is_feedback: bool,
    ) -> Result<Comment, AppError>;

    /// Comments on a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, AppError>;
}

#[derive(Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CommentRepositoryTrait for PostgresCommentRepository {
    #[tracing::instrument(skip(self, body), fields(db.table = "comments", db.operation = "insert", post_id = %post_id))]
    async fn create(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        body: &str,
        is_feedback: bool,
    ) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<Postgres, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, author_id, body, is_feedback)
                VALUES ($1, $2, $3, $4)
                RETURNING id, post_id, author_id, body, is_feedback, created_at
            )
            SELECT i.id, i.post_id, i.author_id, m.display_name AS author_name,
                   i.body, i.is_feedback, i.created_at
            FROM inserted i
            JOIN member_profiles m ON m.id = i.author_id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(body)
        .bind(is_feedback)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    #[tracing::instrument(skip(self), fields(db.table = "comments", db.operation = "select", post_id = %post_id))]
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<Postgres, Comment>(
            r#"
            SELECT c.id, c.post_id, c.author_id, m.display_name AS author_name,
                   c.body, c.is_feedback, c.created_at
            FROM comments c
            JOIN member_profiles m ON m.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
