/// Role and verification guards
///
/// These run after the JWT middleware and read the [`AuthContext`] it
/// injected. The role claim in the token is only a hint; guards that
/// grant data access re-check the account row so a revoked or demoted
/// account is shut out as soon as its row changes, not when its token
/// expires.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{app::AppState, error::ApiError};
use fieldscout_shared::{
    auth::middleware::AuthContext,
    models::account::{Account, AccountRole, VerificationStatus},
};

/// Requires the authenticated account to be an admin
///
/// Verifies against the database, not just the token claim.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = auth_context(&req)?;

    let account = Account::find_by_id(&state.db, auth.account_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    if account.role != AccountRole::Admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(req).await)
}

/// Requires the authenticated account to be a verified scout
pub async fn require_verified_scout(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = auth_context(&req)?;

    let account = Account::find_by_id(&state.db, auth.account_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    if account.role != AccountRole::Scout {
        return Err(ApiError::Forbidden("Scout access required".to_string()));
    }

    if account.verification_status != VerificationStatus::Verified {
        return Err(ApiError::Forbidden(format!(
            "Account is {}; an admin must verify your account to continue",
            account.verification_status.as_str()
        )));
    }

    Ok(next.run(req).await)
}

/// Reads the auth context injected by the JWT layer
pub(crate) fn auth_context(req: &Request) -> Result<AuthContext, ApiError> {
    req.extensions()
        .get::<AuthContext>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}
