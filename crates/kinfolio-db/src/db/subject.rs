use kinfolio_core::models::Subject;
use kinfolio_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::is_unique_violation;

#[async_trait::async_trait]
pub trait SubjectRepositoryTrait: Send + Sync {
    /// All subjects by name.
    async fn list(&self) -> Result<Vec<Subject>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Subject>, AppError>;

    /// Fails with `Conflict` when the name is taken.
    async fn create(&self, name: &str) -> Result<Subject, AppError>;
}

#[derive(Clone)]
pub struct PostgresSubjectRepository {
    pool: PgPool,
}

impl PostgresSubjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SubjectRepositoryTrait for PostgresSubjectRepository {
    #[tracing::instrument(skip(self), fields(db.table = "subjects", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Subject>, AppError> {
        let subjects =
            sqlx::query_as::<Postgres, Subject>("SELECT id, name FROM subjects ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(subjects)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subjects", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Subject>, AppError> {
        let subject =
            sqlx::query_as::<Postgres, Subject>("SELECT id, name FROM subjects WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(subject)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subjects", db.operation = "insert"))]
    async fn create(&self, name: &str) -> Result<Subject, AppError> {
        sqlx::query_as::<Postgres, Subject>(
            "INSERT INTO subjects (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Subject '{}' already exists", name))
            } else {
                e.into()
            }
        })
    }
}
