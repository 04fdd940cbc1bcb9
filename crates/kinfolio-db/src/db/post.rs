use chrono::{DateTime, Utc};
use kinfolio_core::models::{Post, PostInput};
use kinfolio_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::is_foreign_key_violation;

/// Post columns plus the joined subject name; rows come from `posts p JOIN subjects s`.
const POST_SELECT: &str = r#"
    SELECT p.id, p.author_id, p.subject_id, s.name AS subject_name, p.title, p.content,
           p.photo_url, p.annotation, p.audio_url, p.audio_description,
           p.video_url, p.video_description, p.youtube_url, p.status, p.view_count,
           p.created_at, p.updated_at
    FROM posts p
    JOIN subjects s ON s.id = p.subject_id
"#;

/// Which of an author's posts a reader gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostVisibility {
    /// Drafts included; the author looking at their own work.
    All,
    PublishedOnly,
}

impl PostVisibility {
    pub fn for_reader(author_id: Uuid, reader_id: Uuid) -> Self {
        if author_id == reader_id {
            PostVisibility::All
        } else {
            PostVisibility::PublishedOnly
        }
    }

    fn published_only(self) -> bool {
        self == PostVisibility::PublishedOnly
    }
}

/// Narrowing applied to the teacher dashboard's student posts.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    pub student_id: Option<Uuid>,
    /// Case-insensitive substring of the title or video description.
    pub query: Option<String>,
}

impl DashboardFilter {
    /// Whether a post passes the text query.
    pub fn matches_query(&self, post: &Post) -> bool {
        let Some(query) = self.query.as_deref() else {
            return true;
        };
        let needle = query.to_lowercase();
        post.title.to_lowercase().contains(&needle)
            || post
                .video_description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

/// `%query%` for ILIKE with `\`, `%` and `_` taken literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait::async_trait]
pub trait PostRepositoryTrait: Send + Sync {
    async fn create(&self, author_id: Uuid, input: &PostInput) -> Result<Post, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Post>, AppError>;

    async fn update(&self, id: Uuid, input: &PostInput) -> Result<Post, AppError>;

    /// Returns false when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Returns the new view count.
    async fn increment_view_count(&self, id: Uuid) -> Result<i64, AppError>;

    /// Author's posts, newest first, optionally limited to `[from, to)`.
    async fn list_by_author(
        &self,
        author_id: Uuid,
        visibility: PostVisibility,
        created_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Post>, AppError>;

    /// Creation timestamps of the author's posts (heatmap and archive input).
    async fn list_author_timestamps(
        &self,
        author_id: Uuid,
        visibility: PostVisibility,
    ) -> Result<Vec<DateTime<Utc>>, AppError>;

    /// Published posts of every member of the family, newest first.
    async fn list_family_timeline(
        &self,
        family_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, AppError>;

    async fn count_family_timeline(&self, family_id: Uuid) -> Result<i64, AppError>;

    /// Posts by the family's students, newest first.
    async fn list_for_dashboard(
        &self,
        family_id: Uuid,
        filter: &DashboardFilter,
    ) -> Result<Vec<Post>, AppError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_write_error(err: sqlx::Error) -> AppError {
        if is_foreign_key_violation(&err) {
            AppError::InvalidInput("Unknown subject".to_string())
        } else {
            err.into()
        }
    }
}

#[async_trait::async_trait]
impl PostRepositoryTrait for PostgresPostRepository {
    #[tracing::instrument(skip(self, input), fields(db.table = "posts", db.operation = "insert", author_id = %author_id))]
    async fn create(&self, author_id: Uuid, input: &PostInput) -> Result<Post, AppError> {
        let id: Uuid = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            INSERT INTO posts (
                author_id, subject_id, title, content, photo_url, annotation,
                audio_url, audio_description, video_url, video_description,
                youtube_url, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(input.subject_id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.photo_url)
        .bind(&input.annotation)
        .bind(&input.audio_url)
        .bind(&input.audio_description)
        .bind(&input.video_url)
        .bind(&input.video_description)
        .bind(&input.youtube_url)
        .bind(input.status)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_write_error)?;

        self.get(id)
            .await?
            .ok_or_else(|| AppError::Internal("Created post disappeared".to_string()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<Postgres, Post>(&format!("{} WHERE p.id = $1", POST_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "posts", db.operation = "update", db.record_id = %id))]
    async fn update(&self, id: Uuid, input: &PostInput) -> Result<Post, AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE posts
            SET subject_id = $2, title = $3, content = $4, photo_url = $5, annotation = $6,
                audio_url = $7, audio_description = $8, video_url = $9,
                video_description = $10, youtube_url = $11, status = $12,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.subject_id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.photo_url)
        .bind(&input.annotation)
        .bind(&input.audio_url)
        .bind(&input.audio_description)
        .bind(&input.video_url)
        .bind(&input.video_description)
        .bind(&input.youtube_url)
        .bind(input.status)
        .execute(&self.pool)
        .await
        .map_err(Self::map_write_error)?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "update", db.record_id = %id))]
    async fn increment_view_count(&self, id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "UPDATE posts SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        count.ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "select", author_id = %author_id))]
    async fn list_by_author(
        &self,
        author_id: Uuid,
        visibility: PostVisibility,
        created_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Post>, AppError> {
        let (from, to) = created_between.unzip();
        let posts = sqlx::query_as::<Postgres, Post>(&format!(
            r#"
            {}
            WHERE p.author_id = $1
              AND (NOT $2 OR p.status = 'published')
              AND ($3::timestamptz IS NULL OR p.created_at >= $3)
              AND ($4::timestamptz IS NULL OR p.created_at < $4)
            ORDER BY p.created_at DESC, p.id DESC
            "#,
            POST_SELECT
        ))
        .bind(author_id)
        .bind(visibility.published_only())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "select", author_id = %author_id))]
    async fn list_author_timestamps(
        &self,
        author_id: Uuid,
        visibility: PostVisibility,
    ) -> Result<Vec<DateTime<Utc>>, AppError> {
        let timestamps = sqlx::query_scalar::<Postgres, DateTime<Utc>>(
            r#"
            SELECT created_at FROM posts
            WHERE author_id = $1 AND (NOT $2 OR status = 'published')
            ORDER BY created_at ASC
            "#,
        )
        .bind(author_id)
        .bind(visibility.published_only())
        .fetch_all(&self.pool)
        .await?;

        Ok(timestamps)
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "select", family_id = %family_id))]
    async fn list_family_timeline(
        &self,
        family_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<Postgres, Post>(&format!(
            r#"
            {}
            JOIN member_profiles m ON m.id = p.author_id
            WHERE m.family_id = $1 AND p.status = 'published'
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
            POST_SELECT
        ))
        .bind(family_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "count", family_id = %family_id))]
    async fn count_family_timeline(&self, family_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*) FROM posts p
            JOIN member_profiles m ON m.id = p.author_id
            WHERE m.family_id = $1 AND p.status = 'published'
            "#,
        )
        .bind(family_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self, filter), fields(db.table = "posts", db.operation = "select", family_id = %family_id))]
    async fn list_for_dashboard(
        &self,
        family_id: Uuid,
        filter: &DashboardFilter,
    ) -> Result<Vec<Post>, AppError> {
        let pattern = filter.query.as_deref().map(like_pattern);
        let posts = sqlx::query_as::<Postgres, Post>(&format!(
            r#"
            {}
            JOIN member_profiles m ON m.id = p.author_id
            WHERE m.family_id = $1
              AND m.role = 'student'
              AND ($2::uuid IS NULL OR p.author_id = $2)
              AND ($3::text IS NULL OR p.title ILIKE $3 OR p.video_description ILIKE $3)
            ORDER BY p.created_at DESC, p.id DESC
            "#,
            POST_SELECT
        ))
        .bind(family_id)
        .bind(filter.student_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinfolio_core::models::PostStatus;

    fn post(title: &str, video_description: Option<&str>) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            subject_name: "Science".to_string(),
            title: title.to_string(),
            content: String::new(),
            photo_url: None,
            annotation: None,
            audio_url: None,
            audio_description: None,
            video_url: None,
            video_description: video_description.map(str::to_string),
            youtube_url: None,
            status: PostStatus::Published,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("volcano"), "%volcano%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_query_matches_title_or_video_description() {
        let filter = DashboardFilter {
            student_id: None,
            query: Some("VOLCANO".to_string()),
        };
        assert!(filter.matches_query(&post("My volcano", None)));
        assert!(filter.matches_query(&post("Lab day", Some("building a Volcano"))));
        assert!(!filter.matches_query(&post("Lab day", Some("magnets"))));
        assert!(DashboardFilter::default().matches_query(&post("anything", None)));
    }

    #[test]
    fn test_visibility_for_reader() {
        let author = Uuid::new_v4();
        assert_eq!(PostVisibility::for_reader(author, author), PostVisibility::All);
        assert_eq!(
            PostVisibility::for_reader(author, Uuid::new_v4()),
            PostVisibility::PublishedOnly
        );
    }
}
