use kinfolio_core::AppError;
use sqlx::PgPool;

/// Storage liveness probe used by `/health`.
#[async_trait::async_trait]
pub trait HealthCheckTrait: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PostgresHealthCheck {
    pool: PgPool,
}

impl PostgresHealthCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl HealthCheckTrait for PostgresHealthCheck {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
