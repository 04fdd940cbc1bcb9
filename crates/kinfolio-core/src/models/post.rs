use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{CommentResponse, PeerReviewRequest, PresentationSummary};

/// Publication state of a post
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "post_status", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    #[default]
    Published,
}

/// Journal / photo / audio / video entry written by a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub subject_id: Uuid,
    /// Joined from `subjects`.
    pub subject_name: String,
    pub title: String,
    pub content: String,
    pub photo_url: Option<String>,
    pub annotation: Option<String>,
    pub audio_url: Option<String>,
    pub audio_description: Option<String>,
    pub video_url: Option<String>,
    pub video_description: Option<String>,
    pub youtube_url: Option<String>,
    pub status: PostStatus,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated content of a post, shared by create and update.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct PostInput {
    pub subject_id: Uuid,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,
    #[validate(length(max = 50000))]
    pub content: String,
    #[serde(default)]
    #[validate(url)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub audio_description: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_description: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub subject_id: Uuid,
    pub subject_name: String,
    pub title: String,
    pub content: String,
    pub photo_url: Option<String>,
    pub annotation: Option<String>,
    pub audio_url: Option<String>,
    pub audio_description: Option<String>,
    pub video_url: Option<String>,
    pub video_description: Option<String>,
    pub youtube_url: Option<String>,
    pub youtube_embed_url: Option<String>,
    pub status: PostStatus,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        let youtube_embed_url = post
            .youtube_url
            .as_deref()
            .and_then(crate::embed::youtube_embed_url);
        PostResponse {
            id: post.id,
            author_id: post.author_id,
            subject_id: post.subject_id,
            subject_name: post.subject_name,
            title: post.title,
            content: post.content,
            photo_url: post.photo_url,
            annotation: post.annotation,
            audio_url: post.audio_url,
            audio_description: post.audio_description,
            video_url: post.video_url,
            video_description: post.video_description,
            youtube_url: post.youtube_url,
            youtube_embed_url,
            status: post.status,
            view_count: post.view_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

/// An author's page: posts, archive years, presentations and pending reviews.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorPostsResponse {
    pub author_id: Uuid,
    pub display_name: String,
    pub posts: Vec<PostResponse>,
    pub archive_years: Vec<i32>,
    pub selected_year: Option<i32>,
    pub current_year: i32,
    pub presentations: Vec<PresentationSummary>,
    pub pending_reviews: Vec<PeerReviewRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimelinePage {
    pub page: i64,
    pub total_pages: i64,
    pub total_posts: i64,
    pub posts: Vec<PostResponse>,
}
