/// Completeness and verification gates
///
/// Pure decision functions applied before stateful player operations
/// (video upload, being listed to scouts). Both gates are PLAYER-scoped:
/// scouts and admins pass unconditionally, their access is controlled
/// elsewhere by role guards.
///
/// Ordering invariant: `require_verified` checks completeness first, so a
/// player with an incomplete profile always sees the incomplete-profile
/// error, never the not-verified one, regardless of status.

use crate::auth::completion::completion_percentage;
use crate::models::account::{Account, AccountRole, VerificationStatus};

/// Reason a gated operation was denied
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Profile is not 100% complete
    #[error("Profile is {percentage}% complete; complete your profile to continue")]
    IncompleteProfile {
        /// Current completion percentage
        percentage: u8,
    },

    /// Account has not been verified by an admin
    #[error("Account is {status:?}; an admin must verify your account to continue")]
    NotVerified {
        /// Current verification status
        status: VerificationStatus,
    },
}

/// Requires a 100% complete profile
///
/// Non-PLAYER roles pass unconditionally.
pub fn require_complete(account: &Account, has_player_profile: bool) -> Result<(), GateError> {
    if account.role != AccountRole::Player {
        return Ok(());
    }

    let percentage = completion_percentage(account, has_player_profile);
    if percentage < 100 {
        return Err(GateError::IncompleteProfile { percentage });
    }

    Ok(())
}

/// Requires a complete profile AND admin verification
///
/// Completeness is evaluated first. Non-PLAYER roles pass unconditionally.
///
/// # Example
///
/// ```
/// # use fieldscout_shared::auth::gate::{require_verified, GateError};
/// # use fieldscout_shared::models::account::Account;
/// # fn example(account: &Account) {
/// match require_verified(account, true) {
///     Ok(()) => { /* proceed with upload */ }
///     Err(GateError::IncompleteProfile { percentage }) => {
///         // 403 with the percentage in the body
///         let _ = percentage;
///     }
///     Err(GateError::NotVerified { status }) => {
///         let _ = status;
///     }
/// }
/// # }
/// ```
pub fn require_verified(account: &Account, has_player_profile: bool) -> Result<(), GateError> {
    require_complete(account, has_player_profile)?;

    if account.role != AccountRole::Player {
        return Ok(());
    }

    if account.verification_status != VerificationStatus::Verified {
        return Err(GateError::NotVerified {
            status: account.verification_status,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn account(role: AccountRole, status: VerificationStatus, complete: bool) -> Account {
        let field = |v: &str| {
            if complete {
                Some(v.to_string())
            } else {
                None
            }
        };

        Account {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            password_hash: "hash".to_string(),
            role,
            name: field("Ada Marner"),
            phone_number: field("5551234567"),
            country_code: field("+34"),
            city: field("Valencia"),
            state: field("Valencia"),
            country: field("Spain"),
            postal_code: field("46001"),
            profile_picture: field("/uploads/profile-pictures/a.png"),
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
    fn test_incomplete_player_blocked() {
        let player = account(AccountRole::Player, VerificationStatus::Pending, false);
        let err = require_complete(&player, false).unwrap_err();
        assert!(matches!(err, GateError::IncompleteProfile { percentage } if percentage < 100));
    }

    #[test]
    fn test_complete_player_passes_completeness() {
        let player = account(AccountRole::Player, VerificationStatus::Pending, true);
        assert!(require_complete(&player, true).is_ok());
    }

    #[test]
    fn test_verified_gate_never_admits_incomplete() {
        // Even a VERIFIED player is blocked on incompleteness first
        let player = account(AccountRole::Player, VerificationStatus::Verified, false);
        let err = require_verified(&player, false).unwrap_err();
        assert!(matches!(err, GateError::IncompleteProfile { .. }));
    }

    #[test]
    fn test_complete_but_unverified_blocked() {
        for status in [VerificationStatus::Pending, VerificationStatus::Rejected] {
            let player = account(AccountRole::Player, status, true);
            let err = require_verified(&player, true).unwrap_err();
            assert_eq!(err, GateError::NotVerified { status });
        }
    }

    #[test]
    fn test_complete_verified_player_passes() {
        let player = account(AccountRole::Player, VerificationStatus::Verified, true);
        assert!(require_verified(&player, true).is_ok());
    }

    #[test]
    fn test_non_players_pass_both_gates() {
        for role in [AccountRole::Scout, AccountRole::Admin] {
            let account = account(role, VerificationStatus::Pending, false);
            assert!(require_complete(&account, false).is_ok());
            assert!(require_verified(&account, false).is_ok());
        }
    }

    #[test]
    fn test_forbidden_then_verified_then_allowed() {
        let mut player = account(AccountRole::Player, VerificationStatus::Pending, true);
        assert!(require_verified(&player, true).is_err());

        player.verification_status = VerificationStatus::Verified;
        assert!(require_verified(&player, true).is_ok());

        // Reset back to PENDING re-blocks
        player.verification_status = VerificationStatus::Pending;
        assert!(require_verified(&player, true).is_err());
    }
}
