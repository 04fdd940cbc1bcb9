//! Configuration validation
//!
//! Startup checks on top of `Config::validate` that only warn, plus the
//! hard checks again so a hand-built `Config` cannot skip them.

use anyhow::Result;
use kinfolio_core::Config;

/// Validate critical configuration values
///
/// Fails fast on settings that would be unsafe or unusable at runtime and
/// warns about ones that are merely suspicious.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();
    if config.is_production() && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    if config.jwt_expiry_hours <= 0 {
        return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be positive"));
    }

    if config.jwt_expiry_hours > 24 * 30 {
        tracing::warn!(
            jwt_expiry_hours = config.jwt_expiry_hours,
            "JWT_EXPIRY_HOURS is longer than 30 days"
        );
    }

    if config.timeline_page_size > 100 {
        tracing::warn!(
            timeline_page_size = config.timeline_page_size,
            "TIMELINE_PAGE_SIZE is unusually large"
        );
    }

    if config.invite_code_max_attempts < 10 {
        tracing::warn!(
            invite_code_max_attempts = config.invite_code_max_attempts,
            "INVITE_CODE_MAX_ATTEMPTS is low - busy deployments may report exhaustion early"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinfolio_core::LogFormat;

    fn config() -> Config {
        Config {
            server_port: 4000,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            database_url: "postgres://localhost/kinfolio".to_string(),
            db_max_connections: 5,
            db_timeout_seconds: 5,
            jwt_secret: "x".repeat(40),
            jwt_expiry_hours: 24,
            time_zone: chrono_tz::Tz::UTC,
            invite_code_max_attempts: 100,
            timeline_page_size: 6,
            log_format: LogFormat::Compact,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&config()).is_ok());
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let mut config = config();
        config.jwt_expiry_hours = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_core_rules_still_apply() {
        let mut config = config();
        config.timeline_page_size = 0;
        assert!(validate_config(&config).is_err());
    }
}
