//! Kinfolio Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! pure algorithms (tenancy guard, invite codes, activity heatmap, dashboard
//! aggregation) shared across all Kinfolio components.

pub mod config;
pub mod dashboard;
pub mod embed;
pub mod error;
pub mod heatmap;
pub mod invite_code;
pub mod models;
pub mod tenancy;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use dashboard::{archive_years, subject_distribution, year_bounds, SubjectShare};
pub use embed::youtube_embed_url;
pub use heatmap::{
    activity_level, build_heatmap, Heatmap, HeatmapBuilder, HeatmapCell, HeatmapSummary, MonthLabel,
};
pub use invite_code::{generate_invite_code, is_valid_invite_code, normalize_invite_code};
pub use tenancy::{can_view, ensure_can_view};
