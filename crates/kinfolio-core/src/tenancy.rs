//! Family-scoped visibility.
//!
//! Every handler that shows one member's content to another goes through
//! [`can_view`] (or [`ensure_can_view`] when it wants an error to propagate).
//! The predicate fails closed: a profile that has not joined a family can
//! neither see nor be seen.

use crate::models::MemberProfile;
use crate::AppError;

/// Whether `requester` may view content owned by `target`.
///
/// True iff both profiles belong to the same family (compared by id).
/// A profile without a family sees nothing, not even its own gated pages.
pub fn can_view(requester: &MemberProfile, target: &MemberProfile) -> bool {
    match (requester.family_id, target.family_id) {
        (Some(requester_family), Some(target_family)) => requester_family == target_family,
        _ => false,
    }
}

/// [`can_view`] as a `Result`.
///
/// A requester without a family gets [`AppError::FamilyRequired`] so the
/// caller can route them to the join flow. A denied cross-family lookup is
/// reported as `NotFound` so ids from other families are not confirmed to exist.
pub fn ensure_can_view(
    requester: &MemberProfile,
    target: &MemberProfile,
    what: &str,
) -> Result<(), AppError> {
    if requester.family_id.is_none() {
        return Err(AppError::FamilyRequired);
    }
    if can_view(requester, target) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("{} not found", what)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRole;
    use chrono::Utc;
    use uuid::Uuid;

    fn profile(family_id: Option<Uuid>) -> MemberProfile {
        let now = Utc::now();
        MemberProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            family_id,
            display_name: "Ada".to_string(),
            role: MemberRole::Student,
            bio: None,
            avatar_url: None,
            theme: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_same_family_can_view() {
        let family = Uuid::new_v4();
        let a = profile(Some(family));
        let b = profile(Some(family));
        assert!(can_view(&a, &b));
        assert!(can_view(&b, &a));
    }

    #[test]
    fn test_moving_family_changes_visibility() {
        let t1 = Uuid::new_v4();
        let t2 = Uuid::new_v4();
        let a = profile(Some(t1));
        let mut b = profile(Some(t2));
        assert!(!can_view(&a, &b));

        b.family_id = Some(t1);
        assert!(can_view(&a, &b));
    }

    #[test]
    fn test_missing_family_fails_closed_both_ways() {
        let family = Uuid::new_v4();
        let member = profile(Some(family));
        let loner = profile(None);
        assert!(!can_view(&loner, &member));
        assert!(!can_view(&member, &loner));
        assert!(!can_view(&loner, &profile(None)));
    }

    #[test]
    fn test_self_view() {
        let member = profile(Some(Uuid::new_v4()));
        assert!(can_view(&member, &member));

        let loner = profile(None);
        assert!(!can_view(&loner, &loner));
    }

    #[test]
    fn test_symmetry_over_combinations() {
        let t1 = Some(Uuid::new_v4());
        let t2 = Some(Uuid::new_v4());
        let families = [None, t1, t2];
        for left in families {
            for right in families {
                let a = profile(left);
                let b = profile(right);
                assert_eq!(can_view(&a, &b), can_view(&b, &a));
            }
        }
    }

    #[test]
    fn test_ensure_can_view_errors() {
        let a = profile(Some(Uuid::new_v4()));
        let b = profile(Some(Uuid::new_v4()));
        let loner = profile(None);

        assert!(matches!(
            ensure_can_view(&loner, &a, "Profile"),
            Err(AppError::FamilyRequired)
        ));
        match ensure_can_view(&a, &b, "Profile") {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Profile not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
        assert!(ensure_can_view(&a, &a, "Profile").is_ok());
    }
}
