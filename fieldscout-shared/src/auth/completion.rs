/// Profile completion evaluator
///
/// Computes how complete an account's profile is as a percentage over a
/// fixed set of ten fields. Pure and deterministic: same account state,
/// same result. The gate in [`super::gate`] requires 100% before a player
/// may upload videos or be surfaced to scouts.
///
/// # Fields counted
///
/// name, email, phone_number, country_code, city, state, country,
/// postal_code, profile_picture, and the presence of a player profile
/// record. String fields count when present and non-empty.

use crate::models::account::Account;

/// Number of fields in the fixed completion set
const FIELD_COUNT: u32 = 10;

/// Computes profile completion as a rounded percentage (0..=100)
///
/// `has_player_profile` is passed in rather than queried here so the
/// evaluator stays pure; callers fetch it with
/// `PlayerProfile::exists_for_account`.
///
/// # Example
///
/// ```
/// # use fieldscout_shared::auth::completion::completion_percentage;
/// # use fieldscout_shared::models::account::Account;
/// # fn example(account: &Account) {
/// let percentage = completion_percentage(account, true);
/// assert!(percentage <= 100);
/// # }
/// ```
pub fn completion_percentage(account: &Account, has_player_profile: bool) -> u8 {
    let string_fields: [Option<&String>; 8] = [
        account.name.as_ref(),
        account.phone_number.as_ref(),
        account.country_code.as_ref(),
        account.city.as_ref(),
        account.state.as_ref(),
        account.country.as_ref(),
        account.postal_code.as_ref(),
        account.profile_picture.as_ref(),
    ];

    let mut completed: u32 = string_fields
        .iter()
        .filter(|f| matches!(f, Some(s) if !s.trim().is_empty()))
        .count() as u32;

    // Email is NOT NULL at the schema level, but counts toward the same
    // denominator for a stable percentage.
    if !account.email.trim().is_empty() {
        completed += 1;
    }

    if has_player_profile {
        completed += 1;
    }

    ((100 * completed + FIELD_COUNT / 2) / FIELD_COUNT) as u8
}

/// Whether the profile is complete (exactly 100%)
pub fn is_complete(account: &Account, has_player_profile: bool) -> bool {
    completion_percentage(account, has_player_profile) == 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::{AccountRole, VerificationStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn bare_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "player@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: AccountRole::Player,
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
            verification_status: VerificationStatus::Pending,
            verification_remarks: None,
            verified_by: None,
            verified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    fn full_account() -> Account {
        let mut account = bare_account();
        account.name = Some("Ada Marner".to_string());
        account.phone_number = Some("5551234567".to_string());
        account.country_code = Some("+34".to_string());
        account.city = Some("Valencia".to_string());
        account.state = Some("Valencia".to_string());
        account.country = Some("Spain".to_string());
        account.postal_code = Some("46001".to_string());
        account.profile_picture = Some("/uploads/profile-pictures/a.png".to_string());
        account
    }

    #[test]
    fn test_email_only_is_ten_percent() {
        assert_eq!(completion_percentage(&bare_account(), false), 10);
    }

    #[test]
    fn test_all_fields_is_hundred() {
        assert_eq!(completion_percentage(&full_account(), true), 100);
        assert!(is_complete(&full_account(), true));
    }

    #[test]
    fn test_hundred_requires_all_ten() {
        // Missing the player profile alone keeps it below 100
        assert_eq!(completion_percentage(&full_account(), false), 90);
        assert!(!is_complete(&full_account(), false));

        let mut account = full_account();
        account.postal_code = None;
        assert_eq!(completion_percentage(&account, true), 90);
    }

    #[test]
    fn test_empty_strings_do_not_count() {
        let mut account = full_account();
        account.city = Some("".to_string());
        account.state = Some("   ".to_string());
        assert_eq!(completion_percentage(&account, true), 80);
    }

    #[test]
    fn test_monotonic_in_filled_fields() {
        let mut account = bare_account();
        let mut last = completion_percentage(&account, false);

        account.name = Some("Ada".to_string());
        let next = completion_percentage(&account, false);
        assert!(next > last);
        last = next;

        account.phone_number = Some("5551234567".to_string());
        let next = completion_percentage(&account, false);
        assert!(next > last);
        last = next;

        let next = completion_percentage(&account, true);
        assert!(next > last);
    }
}
