//! HTTP handlers, one module per resource.

pub mod announcements;
pub mod comments;
pub mod dashboard;
pub mod families;
pub mod guard;
pub mod peer_reviews;
pub mod posts;
pub mod presentations;
pub mod profiles;
pub mod subjects;
pub mod timeline;
