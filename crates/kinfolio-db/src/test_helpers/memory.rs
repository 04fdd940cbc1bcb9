//! In-memory repository implementations for testing
//!
//! One [`InMemoryDatabase`] holds every table and implements every repository
//! trait, so joins (subject names, author names, family membership) behave
//! like the SQL versions. Clones share the same tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kinfolio_core::models::{
    Announcement, Comment, Family, InviteCodeWrite, MemberProfile, MemberRole, NewProfile,
    PeerReviewRequest, Post, PostInput, PostStatus, Presentation, ReviewStatus, Subject,
    UpdateProfileRequest,
};
use kinfolio_core::AppError;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::db::{
    AnnouncementRepositoryTrait, CommentRepositoryTrait, FamilyRepositoryTrait,
    HealthCheckTrait, PeerReviewRepositoryTrait, PostRepositoryTrait,
    PresentationRepositoryTrait, ProfileRepositoryTrait, SubjectRepositoryTrait,
};
use crate::{DashboardFilter, PostVisibility, PresentationDraft};

#[derive(Default)]
struct Tables {
    families: HashMap<Uuid, Family>,
    profiles: HashMap<Uuid, MemberProfile>,
    subjects: HashMap<Uuid, Subject>,
    posts: HashMap<Uuid, Post>,
    comments: Vec<Comment>,
    reviews: Vec<PeerReviewRequest>,
    presentations: HashMap<Uuid, Presentation>,
    /// presentation id -> post ids in position order
    presentation_items: HashMap<Uuid, Vec<Uuid>>,
    announcements: Vec<Announcement>,
}

impl Tables {
    fn family_of(&self, profile_id: Uuid) -> Option<Uuid> {
        self.profiles.get(&profile_id).and_then(|p| p.family_id)
    }

    fn subject_name(&self, subject_id: Uuid) -> Result<String, AppError> {
        self.subjects
            .get(&subject_id)
            .map(|s| s.name.clone())
            .ok_or_else(|| AppError::InvalidInput("Unknown subject".to_string()))
    }
}

fn newest_first(posts: &mut [Post]) {
    posts.sort_by_key(|p| Reverse((p.created_at, p.id)));
}

/// Mock database for testing without PostgreSQL
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a post with an explicit creation time.
    pub fn insert_post_at(
        &self,
        author_id: Uuid,
        subject_id: Uuid,
        title: &str,
        created_at: DateTime<Utc>,
    ) -> Post {
        let mut tables = self.tables.lock().unwrap();
        let subject_name = tables
            .subjects
            .get(&subject_id)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let post = Post {
            id: Uuid::new_v4(),
            author_id,
            subject_id,
            subject_name,
            title: title.to_string(),
            content: String::new(),
            photo_url: None,
            annotation: None,
            audio_url: None,
            audio_description: None,
            video_url: None,
            video_description: None,
            youtube_url: None,
            status: PostStatus::Published,
            view_count: 0,
            created_at,
            updated_at: created_at,
        };
        tables.posts.insert(post.id, post.clone());
        post
    }

    /// Seed a family that already holds `code`.
    pub fn insert_family_with_code(&self, name: &str, code: &str) -> Family {
        let now = Utc::now();
        let family = Family {
            id: Uuid::new_v4(),
            name: name.to_string(),
            invite_code: Some(code.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .families
            .insert(family.id, family.clone());
        family
    }

    pub fn profile_by_user(&self, user_id: Uuid) -> Option<MemberProfile> {
        self.tables
            .lock()
            .unwrap()
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned()
    }

    pub fn review_requests(&self) -> Vec<PeerReviewRequest> {
        self.tables.lock().unwrap().reviews.clone()
    }
}

#[async_trait]
impl FamilyRepositoryTrait for InMemoryDatabase {
    async fn create(&self, name: &str) -> Result<Family, AppError> {
        let now = Utc::now();
        let family = Family {
            id: Uuid::new_v4(),
            name: name.to_string(),
            invite_code: None,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .families
            .insert(family.id, family.clone());
        Ok(family)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Family>, AppError> {
        Ok(self.tables.lock().unwrap().families.get(&id).cloned())
    }

    async fn find_by_invite_code(&self, code: &str) -> Result<Option<Family>, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .families
            .values()
            .find(|f| f.invite_code.as_deref() == Some(code))
            .cloned())
    }

    async fn try_set_invite_code(
        &self,
        family_id: Uuid,
        code: &str,
    ) -> Result<InviteCodeWrite, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.families.contains_key(&family_id) {
            return Err(AppError::NotFound("Family not found".to_string()));
        }
        // Redrawing the current code would leave the old code valid.
        let taken = tables
            .families
            .values()
            .any(|f| f.invite_code.as_deref() == Some(code));
        if taken {
            return Ok(InviteCodeWrite::Collision);
        }
        let family = tables
            .families
            .get_mut(&family_id)
            .ok_or_else(|| AppError::NotFound("Family not found".to_string()))?;
        family.invite_code = Some(code.to_string());
        family.updated_at = Utc::now();
        Ok(InviteCodeWrite::Assigned)
    }
}

#[async_trait]
impl ProfileRepositoryTrait for InMemoryDatabase {
    async fn get_or_create(&self, new: NewProfile) -> Result<MemberProfile, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(existing) = tables.profiles.values().find(|p| p.user_id == new.user_id) {
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let profile = MemberProfile {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            family_id: None,
            display_name: new.display_name,
            role: new.role,
            bio: None,
            avatar_url: None,
            theme: None,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn get(&self, id: Uuid) -> Result<Option<MemberProfile>, AppError> {
        Ok(self.tables.lock().unwrap().profiles.get(&id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<MemberProfile, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        if let Some(name) = &update.display_name {
            profile.display_name = name.clone();
        }
        if let Some(bio) = &update.bio {
            profile.bio = Some(bio.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
        if let Some(theme) = &update.theme {
            profile.theme = Some(theme.clone());
        }
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn set_family(
        &self,
        id: Uuid,
        family_id: Option<Uuid>,
    ) -> Result<MemberProfile, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        profile.family_id = family_id;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn list_family_members(
        &self,
        family_id: Uuid,
        role: Option<MemberRole>,
    ) -> Result<Vec<MemberProfile>, AppError> {
        let mut members: Vec<MemberProfile> = self
            .tables
            .lock()
            .unwrap()
            .profiles
            .values()
            .filter(|p| p.family_id == Some(family_id))
            .filter(|p| role.map_or(true, |r| p.role == r))
            .cloned()
            .collect();
        members.sort_by(|a, b| (&a.display_name, a.id).cmp(&(&b.display_name, b.id)));
        Ok(members)
    }
}

#[async_trait]
impl SubjectRepositoryTrait for InMemoryDatabase {
    async fn list(&self) -> Result<Vec<Subject>, AppError> {
        let mut subjects: Vec<Subject> = self
            .tables
            .lock()
            .unwrap()
            .subjects
            .values()
            .cloned()
            .collect();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Subject>, AppError> {
        Ok(self.tables.lock().unwrap().subjects.get(&id).cloned())
    }

    async fn create(&self, name: &str) -> Result<Subject, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.subjects.values().any(|s| s.name == name) {
            return Err(AppError::Conflict(format!(
                "Subject '{}' already exists",
                name
            )));
        }
        let subject = Subject {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        tables.subjects.insert(subject.id, subject.clone());
        Ok(subject)
    }
}

#[async_trait]
impl PostRepositoryTrait for InMemoryDatabase {
    async fn create(&self, author_id: Uuid, input: &PostInput) -> Result<Post, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let subject_name = tables.subject_name(input.subject_id)?;
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            author_id,
            subject_id: input.subject_id,
            subject_name,
            title: input.title.clone(),
            content: input.content.clone(),
            photo_url: input.photo_url.clone(),
            annotation: input.annotation.clone(),
            audio_url: input.audio_url.clone(),
            audio_description: input.audio_description.clone(),
            video_url: input.video_url.clone(),
            video_description: input.video_description.clone(),
            youtube_url: input.youtube_url.clone(),
            status: input.status,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        Ok(self.tables.lock().unwrap().posts.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, input: &PostInput) -> Result<Post, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let subject_name = tables.subject_name(input.subject_id)?;
        let post = tables
            .posts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        post.subject_id = input.subject_id;
        post.subject_name = subject_name;
        post.title = input.title.clone();
        post.content = input.content.clone();
        post.photo_url = input.photo_url.clone();
        post.annotation = input.annotation.clone();
        post.audio_url = input.audio_url.clone();
        post.audio_description = input.audio_description.clone();
        post.video_url = input.video_url.clone();
        post.video_description = input.video_description.clone();
        post.youtube_url = input.youtube_url.clone();
        post.status = input.status;
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let removed = tables.posts.remove(&id).is_some();
        if removed {
            tables.comments.retain(|c| c.post_id != id);
            tables.reviews.retain(|r| r.post_id != id);
            for items in tables.presentation_items.values_mut() {
                items.retain(|post_id| *post_id != id);
            }
        }
        Ok(removed)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<i64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let post = tables
            .posts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        post.view_count += 1;
        Ok(post.view_count)
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        visibility: PostVisibility,
        created_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Post>, AppError> {
        let mut posts: Vec<Post> = self
            .tables
            .lock()
            .unwrap()
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .filter(|p| visibility == PostVisibility::All || p.status == PostStatus::Published)
            .filter(|p| {
                created_between.map_or(true, |(from, to)| p.created_at >= from && p.created_at < to)
            })
            .cloned()
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn list_author_timestamps(
        &self,
        author_id: Uuid,
        visibility: PostVisibility,
    ) -> Result<Vec<DateTime<Utc>>, AppError> {
        let mut timestamps: Vec<DateTime<Utc>> =
            PostRepositoryTrait::list_by_author(self, author_id, visibility, None)
                .await?
            .into_iter()
            .map(|p| p.created_at)
            .collect();
        timestamps.sort();
        Ok(timestamps)
    }

    async fn list_family_timeline(
        &self,
        family_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.status == PostStatus::Published)
            .filter(|p| tables.family_of(p.author_id) == Some(family_id))
            .cloned()
            .collect();
        newest_first(&mut posts);
        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_family_timeline(&self, family_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .posts
            .values()
            .filter(|p| p.status == PostStatus::Published)
            .filter(|p| tables.family_of(p.author_id) == Some(family_id))
            .count() as i64)
    }

    async fn list_for_dashboard(
        &self,
        family_id: Uuid,
        filter: &DashboardFilter,
    ) -> Result<Vec<Post>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| {
                tables.profiles.get(&p.author_id).is_some_and(|author| {
                    author.family_id == Some(family_id) && author.role == MemberRole::Student
                })
            })
            .filter(|p| filter.student_id.map_or(true, |id| p.author_id == id))
            .filter(|p| filter.matches_query(p))
            .cloned()
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }
}

#[async_trait]
impl CommentRepositoryTrait for InMemoryDatabase {
    async fn create(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        body: &str,
        is_feedback: bool,
    ) -> Result<Comment, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let author_name = tables
            .profiles
            .get(&author_id)
            .map(|p| p.display_name.clone())
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            author_name,
            body: body.to_string(),
            is_feedback,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PeerReviewRepositoryTrait for InMemoryDatabase {
    async fn get_or_create(
        &self,
        post_id: Uuid,
        requester_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<PeerReviewRequest, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(existing) = tables
            .reviews
            .iter()
            .find(|r| r.post_id == post_id && r.reviewer_id == reviewer_id)
        {
            return Ok(existing.clone());
        }
        let request = PeerReviewRequest {
            id: Uuid::new_v4(),
            post_id,
            requester_id,
            reviewer_id,
            status: ReviewStatus::Pending,
            created_at: Utc::now(),
        };
        tables.reviews.push(request.clone());
        Ok(request)
    }

    async fn complete_for_reviewer(
        &self,
        post_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<u64, AppError> {
        let mut changed = 0;
        for request in self.tables.lock().unwrap().reviews.iter_mut() {
            if request.post_id == post_id
                && request.reviewer_id == reviewer_id
                && request.status == ReviewStatus::Pending
            {
                request.status = ReviewStatus::Completed;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn list_pending_for_reviewer(
        &self,
        reviewer_id: Uuid,
    ) -> Result<Vec<PeerReviewRequest>, AppError> {
        let mut pending: Vec<PeerReviewRequest> = self
            .tables
            .lock()
            .unwrap()
            .reviews
            .iter()
            .filter(|r| r.reviewer_id == reviewer_id && r.status == ReviewStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|r| Reverse((r.created_at, r.id)));
        Ok(pending)
    }
}

#[async_trait]
impl PresentationRepositoryTrait for InMemoryDatabase {
    async fn create(
        &self,
        author_id: Uuid,
        draft: PresentationDraft<'_>,
    ) -> Result<Presentation, AppError> {
        let now = Utc::now();
        let presentation = Presentation {
            id: Uuid::new_v4(),
            author_id,
            kind: draft.kind,
            title: draft.title.to_string(),
            description: draft.description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.lock().unwrap();
        tables
            .presentations
            .insert(presentation.id, presentation.clone());
        tables
            .presentation_items
            .insert(presentation.id, draft.post_ids.to_vec());
        Ok(presentation)
    }

    async fn update(
        &self,
        id: Uuid,
        draft: PresentationDraft<'_>,
    ) -> Result<Presentation, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let presentation = tables
            .presentations
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Presentation not found".to_string()))?;
        presentation.kind = draft.kind;
        presentation.title = draft.title.to_string();
        presentation.description = draft.description.map(str::to_string);
        presentation.updated_at = Utc::now();
        let updated = presentation.clone();
        tables.presentation_items.insert(id, draft.post_ids.to_vec());
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables.presentation_items.remove(&id);
        Ok(tables.presentations.remove(&id).is_some())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Presentation>, AppError> {
        Ok(self.tables.lock().unwrap().presentations.get(&id).cloned())
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Presentation>, AppError> {
        let mut presentations: Vec<Presentation> = self
            .tables
            .lock()
            .unwrap()
            .presentations
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        presentations.sort_by_key(|p| Reverse((p.created_at, p.id)));
        Ok(presentations)
    }

    async fn list_posts(&self, presentation_id: Uuid) -> Result<Vec<Post>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .presentation_items
            .get(&presentation_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tables.posts.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl AnnouncementRepositoryTrait for InMemoryDatabase {
    async fn create(
        &self,
        family_id: Uuid,
        author_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<Announcement, AppError> {
        let announcement = Announcement {
            id: Uuid::new_v4(),
            family_id,
            author_id,
            title: title.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .unwrap()
            .announcements
            .push(announcement.clone());
        Ok(announcement)
    }

    async fn list_for_family(&self, family_id: Uuid) -> Result<Vec<Announcement>, AppError> {
        let mut announcements: Vec<Announcement> = self
            .tables
            .lock()
            .unwrap()
            .announcements
            .iter()
            .filter(|a| a.family_id == family_id)
            .cloned()
            .collect();
        announcements.sort_by_key(|a| Reverse((a.created_at, a.id)));
        Ok(announcements)
    }
}

#[async_trait]
impl HealthCheckTrait for InMemoryDatabase {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
