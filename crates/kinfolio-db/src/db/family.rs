use kinfolio_core::models::{Family, InviteCodeWrite};
use kinfolio_core::{generate_invite_code, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::is_unique_violation;

const FAMILY_COLUMNS: &str = "id, name, invite_code, created_at, updated_at";

/// Trait for family repository operations
#[async_trait::async_trait]
pub trait FamilyRepositoryTrait: Send + Sync {
    async fn create(&self, name: &str) -> Result<Family, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Family>, AppError>;

    async fn find_by_invite_code(&self, code: &str) -> Result<Option<Family>, AppError>;

    /// Store `code` as the family's only active invite code.
    ///
    /// Returns [`InviteCodeWrite::Collision`] when any family holds the code,
    /// this family included; any other failure is an error.
    async fn try_set_invite_code(
        &self,
        family_id: Uuid,
        code: &str,
    ) -> Result<InviteCodeWrite, AppError>;
}

/// Issue a fresh invite code for `family_id`, replacing the previous one.
///
/// Candidates are written through the unique index; a collision is retried
/// with a new candidate and never reaches the caller. After `max_attempts`
/// collisions the code space is treated as exhausted.
#[tracing::instrument(skip(repo), fields(family_id = %family_id))]
pub async fn issue_invite_code(
    repo: &dyn FamilyRepositoryTrait,
    family_id: Uuid,
    max_attempts: u32,
) -> Result<String, AppError> {
    for attempt in 1..=max_attempts {
        let code = generate_invite_code();
        match repo.try_set_invite_code(family_id, &code).await? {
            InviteCodeWrite::Assigned => {
                tracing::info!(attempt, "Invite code issued");
                return Ok(code);
            }
            InviteCodeWrite::Collision => {
                tracing::debug!(attempt, "Invite code collision, retrying");
            }
        }
    }

    tracing::error!(attempts = max_attempts, "Invite code space exhausted");
    Err(AppError::InviteCodeSpaceExhausted {
        attempts: max_attempts,
    })
}

#[derive(Clone)]
pub struct PostgresFamilyRepository {
    pool: PgPool,
}

impl PostgresFamilyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FamilyRepositoryTrait for PostgresFamilyRepository {
    #[tracing::instrument(skip(self), fields(db.table = "families", db.operation = "insert"))]
    async fn create(&self, name: &str) -> Result<Family, AppError> {
        let family = sqlx::query_as::<Postgres, Family>(&format!(
            "INSERT INTO families (name) VALUES ($1) RETURNING {}",
            FAMILY_COLUMNS
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(family)
    }

    #[tracing::instrument(skip(self), fields(db.table = "families", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Family>, AppError> {
        let family = sqlx::query_as::<Postgres, Family>(&format!(
            "SELECT {} FROM families WHERE id = $1",
            FAMILY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(family)
    }

    #[tracing::instrument(skip(self, code), fields(db.table = "families", db.operation = "select"))]
    async fn find_by_invite_code(&self, code: &str) -> Result<Option<Family>, AppError> {
        let family = sqlx::query_as::<Postgres, Family>(&format!(
            "SELECT {} FROM families WHERE invite_code = $1",
            FAMILY_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(family)
    }

    #[tracing::instrument(skip(self, code), fields(db.table = "families", db.operation = "update", db.record_id = %family_id))]
    async fn try_set_invite_code(
        &self,
        family_id: Uuid,
        code: &str,
    ) -> Result<InviteCodeWrite, AppError> {
        // A candidate equal to the current code is a collision: the write
        // must replace the old code.
        let result = sqlx::query(
            "UPDATE families SET invite_code = $2, updated_at = NOW() \
             WHERE id = $1 AND invite_code IS DISTINCT FROM $2",
        )
        .bind(family_id)
        .bind(code)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM families WHERE id = $1)")
                        .bind(family_id)
                        .fetch_one(&self.pool)
                        .await?;
                if exists {
                    Ok(InviteCodeWrite::Collision)
                } else {
                    Err(AppError::NotFound("Family not found".to_string()))
                }
            }
            Ok(_) => Ok(InviteCodeWrite::Assigned),
            Err(e) if is_unique_violation(&e) => Ok(InviteCodeWrite::Collision),
            Err(e) => Err(e.into()),
        }
    }
}
