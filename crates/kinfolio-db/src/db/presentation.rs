use kinfolio_core::models::{Post, Presentation, PresentationKind};
use kinfolio_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const PRESENTATION_COLUMNS: &str = "id, author_id, kind, title, description, created_at, updated_at";

/// Stored shape of a presentation, items in display order.
#[derive(Debug, Clone)]
pub struct PresentationDraft<'a> {
    pub kind: PresentationKind,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub post_ids: &'a [Uuid],
}

#[async_trait::async_trait]
pub trait PresentationRepositoryTrait: Send + Sync {
    async fn create(
        &self,
        author_id: Uuid,
        draft: PresentationDraft<'_>,
    ) -> Result<Presentation, AppError>;

    /// Replace metadata and the full item list.
    async fn update(&self, id: Uuid, draft: PresentationDraft<'_>)
        -> Result<Presentation, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Presentation>, AppError>;

    /// Newest first.
    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Presentation>, AppError>;

    /// Posts of the presentation ordered by position.
    async fn list_posts(&self, presentation_id: Uuid) -> Result<Vec<Post>, AppError>;
}

#[derive(Clone)]
pub struct PostgresPresentationRepository {
    pool: PgPool,
}

impl PostgresPresentationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn replace_items(
        tx: &mut Transaction<'_, Postgres>,
        presentation_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM presentation_items WHERE presentation_id = $1")
            .bind(presentation_id)
            .execute(&mut **tx)
            .await?;

        for (position, post_id) in post_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO presentation_items (presentation_id, post_id, position) VALUES ($1, $2, $3)",
            )
            .bind(presentation_id)
            .bind(post_id)
            .bind(position as i32)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl PresentationRepositoryTrait for PostgresPresentationRepository {
    #[tracing::instrument(skip(self, draft), fields(db.table = "presentations", db.operation = "insert", author_id = %author_id))]
    async fn create(
        &self,
        author_id: Uuid,
        draft: PresentationDraft<'_>,
    ) -> Result<Presentation, AppError> {
        let mut tx = self.pool.begin().await?;

        let presentation = sqlx::query_as::<Postgres, Presentation>(&format!(
            r#"
            INSERT INTO presentations (author_id, kind, title, description)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            PRESENTATION_COLUMNS
        ))
        .bind(author_id)
        .bind(draft.kind)
        .bind(draft.title)
        .bind(draft.description)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_items(&mut tx, presentation.id, draft.post_ids).await?;
        tx.commit().await?;

        Ok(presentation)
    }

    #[tracing::instrument(skip(self, draft), fields(db.table = "presentations", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        id: Uuid,
        draft: PresentationDraft<'_>,
    ) -> Result<Presentation, AppError> {
        let mut tx = self.pool.begin().await?;

        let presentation = sqlx::query_as::<Postgres, Presentation>(&format!(
            r#"
            UPDATE presentations
            SET kind = $2, title = $3, description = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRESENTATION_COLUMNS
        ))
        .bind(id)
        .bind(draft.kind)
        .bind(draft.title)
        .bind(draft.description)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Presentation not found".to_string()))?;

        Self::replace_items(&mut tx, id, draft.post_ids).await?;
        tx.commit().await?;

        Ok(presentation)
    }

    #[tracing::instrument(skip(self), fields(db.table = "presentations", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM presentations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "presentations", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Presentation>, AppError> {
        let presentation = sqlx::query_as::<Postgres, Presentation>(&format!(
            "SELECT {} FROM presentations WHERE id = $1",
            PRESENTATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(presentation)
    }

    #[tracing::instrument(skip(self), fields(db.table = "presentations", db.operation = "select", author_id = %author_id))]
    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Presentation>, AppError> {
        let presentations = sqlx::query_as::<Postgres, Presentation>(&format!(
            "SELECT {} FROM presentations WHERE author_id = $1 ORDER BY created_at DESC, id DESC",
            PRESENTATION_COLUMNS
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(presentations)
    }

    #[tracing::instrument(skip(self), fields(db.table = "presentation_items", db.operation = "select", presentation_id = %presentation_id))]
    async fn list_posts(&self, presentation_id: Uuid) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<Postgres, Post>(
            r#"
            SELECT p.id, p.author_id, p.subject_id, s.name AS subject_name, p.title, p.content,
                   p.photo_url, p.annotation, p.audio_url, p.audio_description,
                   p.video_url, p.video_description, p.youtube_url, p.status, p.view_count,
                   p.created_at, p.updated_at
            FROM presentation_items i
            JOIN posts p ON p.id = i.post_id
            JOIN subjects s ON s.id = p.subject_id
            WHERE i.presentation_id = $1
            ORDER BY i.position ASC
            "#,
        )
        .bind(presentation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }
}
