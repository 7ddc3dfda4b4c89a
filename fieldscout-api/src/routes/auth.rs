/// Authentication endpoints
///
/// Identity lifecycle plus the operator-facing Google Drive consent flow.
///
/// # Endpoints
///
/// - `POST /v1/auth/signup` - Create a PLAYER or SCOUT account
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/logout` - Stateless logout acknowledgement
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `GET /v1/auth/google` - Redirect to the Drive consent screen
/// - `GET /v1/auth/google/callback` - Exchange the authorization code
/// - `GET /v1/auth/google/status` - Credential readiness report

use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use fieldscout_shared::{
    auth::{jwt, password},
    models::account::{Account, AccountRole, CreateAccount},
};

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Account role: PLAYER or SCOUT (case-insensitive)
    pub role: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Signup / login response
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    /// Account ID
    pub account_id: String,

    /// Account role
    pub role: AccountRole,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Creates a new PLAYER or SCOUT account
///
/// Admin accounts are seeded out of band and can never be self-assigned.
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed or role not allowed
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate()?;

    let role = AccountRole::parse(&req.role)
        .filter(|r| *r != AccountRole::Admin)
        .ok_or_else(|| {
            ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "role".to_string(),
                message: "Role must be PLAYER or SCOUT".to_string(),
            }])
        })?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let account = Account::create(
        &state.db,
        CreateAccount {
            email: req.email,
            password_hash,
            role,
            name: req.name,
        },
    )
    .await?;

    Ok(Json(token_pair(&state, &account)?))
}

/// Authenticates an account and returns a token pair
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate()?;

    let account = Account::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &account.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    Account::update_last_login(&state.db, account.id).await?;

    Ok(Json(token_pair(&state, &account)?))
}

/// Stateless logout acknowledgement
///
/// Tokens are not tracked server-side; clients discard them. The endpoint
/// exists so clients have a uniform lifecycle to call.
pub async fn logout() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Logged out" }))
}

/// Exchanges a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Mints an access/refresh pair for an account
fn token_pair(state: &AppState, account: &Account) -> Result<TokenPairResponse, ApiError> {
    let access_claims = jwt::Claims::new(account.id, account.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(account.id, account.role, jwt::TokenType::Refresh);

    Ok(TokenPairResponse {
        account_id: account.id.to_string(),
        role: account.role,
        access_token: jwt::create_token(&access_claims, state.jwt_secret())?,
        refresh_token: jwt::create_token(&refresh_claims, state.jwt_secret())?,
    })
}

/// Consent callback query parameters
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    /// Authorization code issued by the consent screen
    pub code: Option<String>,

    /// Error reported by the consent screen (user denied, etc.)
    pub error: Option<String>,
}

/// Drive credential readiness report
#[derive(Debug, Serialize)]
pub struct GoogleStatusResponse {
    /// OAuth client variables are all present
    pub configured: bool,

    /// A token set is held (uploads will work without a consent round-trip)
    pub ready: bool,
}

/// Redirects the operator to the Google consent screen
///
/// # Errors
///
/// - `503 Service Unavailable`: Drive OAuth client not configured
pub async fn google_consent(State(state): State<AppState>) -> ApiResult<Redirect> {
    let url = state.drive.authorization_url().await?;
    Ok(Redirect::temporary(&url))
}

/// Exchanges the authorization code from the consent redirect
///
/// Returns the refresh token in the JSON body so the operator can persist
/// it into the environment (GOOGLE_REFRESH_TOKEN) for future boots.
///
/// # Errors
///
/// - `400 Bad Request`: Consent denied or code missing
/// - `502 Bad Gateway`: Token endpoint failure
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    if let Some(error) = query.error {
        return Err(ApiError::BadRequest(format!("Consent failed: {}", error)));
    }

    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code".to_string()))?;

    let tokens = state.drive.exchange_code(&code).await?;

    Ok(Json(serde_json::json!({
        "message": "Google Drive connected",
        "refresh_token": tokens.refresh_token,
    })))
}

/// Reports Drive credential readiness
pub async fn google_status(State(state): State<AppState>) -> Json<GoogleStatusResponse> {
    Json(GoogleStatusResponse {
        configured: state.drive.is_configured(),
        ready: state.drive.has_valid_credentials().await,
    })
}
