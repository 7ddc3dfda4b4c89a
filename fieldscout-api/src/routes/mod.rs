/// API route handlers
///
/// Route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Identity lifecycle and the Drive consent flow
/// - `profile`: Own-profile management and completion reporting
/// - `videos`: Video upload, listing, analysis, and deletion
/// - `scout`: Verified-scout review surface
/// - `admin`: Account verification and listings

pub mod admin;
pub mod auth;
pub mod health;
pub mod profile;
pub mod scout;
pub mod videos;

use crate::{app::AppState, error::ApiError};
use fieldscout_shared::{auth::middleware::AuthContext, models::account::Account};

/// Loads the authenticated account's row, failing with 401 if it was
/// deleted after the token was issued
pub(crate) async fn current_account(
    state: &AppState,
    auth: &AuthContext,
) -> Result<Account, ApiError> {
    Account::find_by_id(&state.db, auth.account_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))
}
