use kinfolio_core::models::Announcement;
use kinfolio_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait AnnouncementRepositoryTrait: Send + Sync {
    async fn create(
        &self,
        family_id: Uuid,
        author_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<Announcement, AppError>;

    /// Newest first.
    async fn list_for_family(&self, family_id: Uuid) -> Result<Vec<Announcement>, AppError>;
}

#[derive(Clone)]
pub struct PostgresAnnouncementRepository {
    pool: PgPool,
}

impl PostgresAnnouncementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AnnouncementRepositoryTrait for PostgresAnnouncementRepository {
    #[tracing::instrument(skip(self, title, body), fields(db.table = "announcements", db.operation = "insert", family_id = %family_id))]
    async fn create(
        &self,
        family_id: Uuid,
        author_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<Announcement, AppError> {
        let announcement = sqlx::query_as::<Postgres, Announcement>(
            r#"
            INSERT INTO announcements (family_id, author_id, title, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, family_id, author_id, title, body, created_at
            "#,
        )
        .bind(family_id)
        .bind(author_id)
        .bind(title)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(announcement)
    }

    #[tracing::instrument(skip(self), fields(db.table = "announcements", db.operation = "select", family_id = %family_id))]
    async fn list_for_family(&self, family_id: Uuid) -> Result<Vec<Announcement>, AppError> {
        let announcements = sqlx::query_as::<Postgres, Announcement>(
            r#"
            SELECT id, family_id, author_id, title, body, created_at
            FROM announcements
            WHERE family_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(family_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(announcements)
    }
}
