//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Each sub-module represents a specific feature area.

mod announcement;
mod comment;
mod dashboard;
mod family;
mod peer_review;
mod post;
mod presentation;
mod profile;
mod subject;

// Re-export all models for convenient imports
pub use announcement::*;
pub use comment::*;
pub use dashboard::*;
pub use family::*;
pub use peer_review::*;
pub use post::*;
pub use presentation::*;
pub use profile::*;
pub use subject::*;
