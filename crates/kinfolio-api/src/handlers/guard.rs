//! Role and family checks shared by the handlers.
//!
//! Everything that shows one member's content to another resolves the owner
//! here and passes through `ensure_can_view`.

use crate::state::AppState;
use kinfolio_core::models::{MemberProfile, Post, PostStatus};
use kinfolio_core::{ensure_can_view, AppError};
use uuid::Uuid;

/// The requester's family id, or `FamilyRequired`.
pub fn require_family(profile: &MemberProfile) -> Result<Uuid, AppError> {
    profile.family_id.ok_or(AppError::FamilyRequired)
}

pub fn require_teacher(profile: &MemberProfile) -> Result<(), AppError> {
    if profile.is_teacher() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only teachers can perform this action".to_string(),
        ))
    }
}

pub fn require_owner(owner_id: Uuid, profile: &MemberProfile, what: &str) -> Result<(), AppError> {
    if owner_id == profile.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Only the author can modify this {}",
            what
        )))
    }
}

/// Load a profile the requester is allowed to see.
pub async fn load_viewable_profile(
    state: &AppState,
    requester: &MemberProfile,
    profile_id: Uuid,
    what: &str,
) -> Result<MemberProfile, AppError> {
    if requester.family_id.is_none() {
        return Err(AppError::FamilyRequired);
    }
    let target = state
        .db
        .profiles
        .get(profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", what)))?;
    ensure_can_view(requester, &target, what)?;
    Ok(target)
}

/// Load a post and its author, applying the family gate and hiding other people's drafts.
pub async fn load_viewable_post(
    state: &AppState,
    requester: &MemberProfile,
    post_id: Uuid,
) -> Result<(Post, MemberProfile), AppError> {
    if requester.family_id.is_none() {
        return Err(AppError::FamilyRequired);
    }
    let not_found = || AppError::NotFound("Post not found".to_string());

    let post = state.db.posts.get(post_id).await?.ok_or_else(not_found)?;
    let author = state
        .db
        .profiles
        .get(post.author_id)
        .await?
        .ok_or_else(not_found)?;
    ensure_can_view(requester, &author, "Post")?;

    if post.status == PostStatus::Draft && post.author_id != requester.id {
        return Err(not_found());
    }
    Ok((post, author))
}
