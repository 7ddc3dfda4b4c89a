/// Read-time access control for videos
///
/// A single pure function deciding whether a requester may view a video,
/// given the requester's account and the video owner's account. The list
/// endpoints apply the same rules as a SQL pre-filter; this function is
/// the per-item authority for direct fetches.
///
/// # Rules
///
/// | requester                  | verdict                          |
/// |----------------------------|----------------------------------|
/// | owner of the video         | allow                            |
/// | admin                      | allow                            |
/// | verified scout             | allow iff the owner is verified  |
/// | anyone else                | deny                             |

use uuid::Uuid;

use crate::models::account::{Account, AccountRole, VerificationStatus};

/// Decides whether `requester` may view a video owned by `owner`
///
/// `video_owner_id` is taken from the video row itself so ownership is
/// judged against the video, not against whichever account record the
/// caller happened to load.
pub fn can_view_video(requester: &Account, owner: &Account, video_owner_id: Uuid) -> bool {
    if requester.id == video_owner_id {
        return true;
    }

    match requester.role {
        AccountRole::Admin => true,
        AccountRole::Scout => {
            requester.verification_status == VerificationStatus::Verified
                && owner.verification_status == VerificationStatus::Verified
        }
        AccountRole::Player => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(role: AccountRole, status: VerificationStatus) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            password_hash: "hash".to_string(),
            role,
            name: None,
            phone_number: None,
            country_code: None,
            city: None,
            state: None,
            country: None,
            postal_code: None,
            profile_picture: None,
            club_name: None,
            document_number: None,
            document_photos: vec![],
            verification_status: status,
            verification_remarks: None,
            verified_by: None,
            verified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_owner_always_allowed() {
        // Even an unverified, incomplete player sees their own video
        let owner = account(AccountRole::Player, VerificationStatus::Pending);
        assert!(can_view_video(&owner, &owner, owner.id));
    }

    #[test]
    fn test_admin_always_allowed() {
        let admin = account(AccountRole::Admin, VerificationStatus::Pending);
        let owner = account(AccountRole::Player, VerificationStatus::Rejected);
        assert!(can_view_video(&admin, &owner, owner.id));
    }

    #[test]
    fn test_scout_matrix() {
        let verified_owner = account(AccountRole::Player, VerificationStatus::Verified);
        let pending_owner = account(AccountRole::Player, VerificationStatus::Pending);

        let verified_scout = account(AccountRole::Scout, VerificationStatus::Verified);
        let pending_scout = account(AccountRole::Scout, VerificationStatus::Pending);

        assert!(can_view_video(
            &verified_scout,
            &verified_owner,
            verified_owner.id
        ));
        assert!(!can_view_video(
            &verified_scout,
            &pending_owner,
            pending_owner.id
        ));
        assert!(!can_view_video(
            &pending_scout,
            &verified_owner,
            verified_owner.id
        ));
        assert!(!can_view_video(
            &pending_scout,
            &pending_owner,
            pending_owner.id
        ));
    }

    #[test]
    fn test_other_players_denied() {
        let owner = account(AccountRole::Player, VerificationStatus::Verified);
        let other = account(AccountRole::Player, VerificationStatus::Verified);
        assert!(!can_view_video(&other, &owner, owner.id));
    }
}
