use kinfolio_core::models::{MemberProfile, MemberRole, NewProfile, UpdateProfileRequest};
use kinfolio_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const PROFILE_COLUMNS: &str =
    "id, user_id, family_id, display_name, role, bio, avatar_url, theme, created_at, updated_at";

/// Trait for member profile repository operations
#[async_trait::async_trait]
pub trait ProfileRepositoryTrait: Send + Sync {
    /// Profile for `new.user_id`, created from `new` if this user has none yet.
    async fn get_or_create(&self, new: NewProfile) -> Result<MemberProfile, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<MemberProfile>, AppError>;

    async fn update(
        &self,
        id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<MemberProfile, AppError>;

    /// Join (`Some`) or leave (`None`) a family.
    async fn set_family(
        &self,
        id: Uuid,
        family_id: Option<Uuid>,
    ) -> Result<MemberProfile, AppError>;

    /// Family members ordered by display name, optionally only one role.
    async fn list_family_members(
        &self,
        family_id: Uuid,
        role: Option<MemberRole>,
    ) -> Result<Vec<MemberProfile>, AppError>;
}

#[derive(Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProfileRepositoryTrait for PostgresProfileRepository {
    #[tracing::instrument(skip(self, new), fields(db.table = "member_profiles", db.operation = "upsert", user_id = %new.user_id))]
    async fn get_or_create(&self, new: NewProfile) -> Result<MemberProfile, AppError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let profile = sqlx::query_as::<Postgres, MemberProfile>(&format!(
            r#"
            INSERT INTO member_profiles (user_id, display_name, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(new.user_id)
        .bind(&new.display_name)
        .bind(new.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self), fields(db.table = "member_profiles", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<MemberProfile>, AppError> {
        let profile = sqlx::query_as::<Postgres, MemberProfile>(&format!(
            "SELECT {} FROM member_profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "member_profiles", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<MemberProfile, AppError> {
        let profile = sqlx::query_as::<Postgres, MemberProfile>(&format!(
            r#"
            UPDATE member_profiles
            SET display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                avatar_url = COALESCE($4, avatar_url),
                theme = COALESCE($5, theme),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(&update.display_name)
        .bind(&update.bio)
        .bind(&update.avatar_url)
        .bind(&update.theme)
        .fetch_optional(&self.pool)
        .await?;

        profile.ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "member_profiles", db.operation = "update", db.record_id = %id))]
    async fn set_family(
        &self,
        id: Uuid,
        family_id: Option<Uuid>,
    ) -> Result<MemberProfile, AppError> {
        let profile = sqlx::query_as::<Postgres, MemberProfile>(&format!(
            "UPDATE member_profiles SET family_id = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(family_id)
        .fetch_optional(&self.pool)
        .await?;

        profile.ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "member_profiles", db.operation = "select"))]
    async fn list_family_members(
        &self,
        family_id: Uuid,
        role: Option<MemberRole>,
    ) -> Result<Vec<MemberProfile>, AppError> {
        let members = sqlx::query_as::<Postgres, MemberProfile>(&format!(
            r#"
            SELECT {}
            FROM member_profiles
            WHERE family_id = $1 AND ($2::member_role IS NULL OR role = $2)
            ORDER BY display_name ASC, id ASC
            "#,
            PROFILE_COLUMNS
        ))
        .bind(family_id)
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
