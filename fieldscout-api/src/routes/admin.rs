/// Admin endpoints
///
/// Account verification and the listings that feed the admin dashboard.
/// Every route sits behind the admin guard.
///
/// # Endpoints
///
/// - `PUT /v1/admin/players/:id/verify` - Apply a verification decision to a player
/// - `PUT /v1/admin/scouts/:id/verify` - Apply a verification decision to a scout
/// - `GET /v1/admin/players` - List players, filterable by status and search
/// - `GET /v1/admin/scouts` - List scouts, filterable by status and search
/// - `GET /v1/admin/unverified` - Outstanding verification counts
/// - `POST /v1/admin/videos/:id/metrics` - Record analysis results for a video

use axum::{
    extract::{Path as UrlPath, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use fieldscout_shared::{
    auth::middleware::AuthContext,
    models::{
        account::{Account, AccountRole, VerificationStatus, VerificationUpdate},
        metrics::{CreateMetrics, PerformanceMetrics},
        player_profile::PlayerProfile,
        video::UploadedVideo,
    },
};

/// Verification decision request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Target status: VERIFIED, REJECTED, or PENDING (case-insensitive)
    pub status: String,

    /// Optional remarks recorded with the decision
    pub remarks: Option<String>,
}

/// Account listing query
#[derive(Debug, Deserialize)]
pub struct AccountListQuery {
    /// Filter by verification status (case-insensitive)
    pub status: Option<String>,

    /// Search term over name and email
    pub search: Option<String>,

    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated account listing response
#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub accounts: Vec<Account>,
    pub total: i64,
}

/// Outstanding verification counts
#[derive(Debug, Serialize)]
pub struct UnverifiedResponse {
    /// Players not currently VERIFIED
    pub players: i64,

    /// Scouts not currently VERIFIED
    pub scouts: i64,
}

/// Applies a verification decision to a player
pub async fn verify_player(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    UrlPath(id): UrlPath<Uuid>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<Json<Account>> {
    verify_account(&state, &auth, id, AccountRole::Player, req).await
}

/// Applies a verification decision to a scout
pub async fn verify_scout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    UrlPath(id): UrlPath<Uuid>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<Json<Account>> {
    verify_account(&state, &auth, id, AccountRole::Scout, req).await
}

/// Shared verification workflow
///
/// The status is validated before any mutation; a subject whose role does
/// not match the endpoint is reported as absent, never as a distinct
/// error.
async fn verify_account(
    state: &AppState,
    auth: &AuthContext,
    subject_id: Uuid,
    expected_role: AccountRole,
    req: VerifyRequest,
) -> ApiResult<Json<Account>> {
    let status = VerificationStatus::parse(&req.status).ok_or_else(|| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "status".to_string(),
            message: "Status must be VERIFIED, REJECTED, or PENDING".to_string(),
        }])
    })?;

    let account = Account::set_verification(
        &state.db,
        subject_id,
        expected_role,
        auth.account_id,
        VerificationUpdate {
            status,
            remarks: req.remarks,
        },
    )
    .await?
    .ok_or_else(|| {
        ApiError::NotFound(format!(
            "{} not found",
            match expected_role {
                AccountRole::Player => "Player",
                AccountRole::Scout => "Scout",
                AccountRole::Admin => "Account",
            }
        ))
    })?;

    Ok(Json(account))
}

/// Lists players for the admin dashboard
pub async fn list_players(
    State(state): State<AppState>,
    Query(query): Query<AccountListQuery>,
) -> ApiResult<Json<AccountListResponse>> {
    list_accounts(&state, AccountRole::Player, query).await
}

/// Lists scouts for the admin dashboard
pub async fn list_scouts(
    State(state): State<AppState>,
    Query(query): Query<AccountListQuery>,
) -> ApiResult<Json<AccountListResponse>> {
    list_accounts(&state, AccountRole::Scout, query).await
}

/// Shared role-scoped listing
async fn list_accounts(
    state: &AppState,
    role: AccountRole,
    query: AccountListQuery,
) -> ApiResult<Json<AccountListResponse>> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(VerificationStatus::parse(raw).ok_or_else(|| {
            ApiError::BadRequest(
                "Status filter must be VERIFIED, REJECTED, or PENDING".to_string(),
            )
        })?),
        None => None,
    };

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    let search = query.search.as_deref();

    let accounts = Account::list_by_role(&state.db, role, status, search, limit, offset).await?;
    let total = Account::count_by_role(&state.db, role, status, search).await?;

    Ok(Json(AccountListResponse { accounts, total }))
}

/// Reports outstanding verification counts
pub async fn unverified_counts(
    State(state): State<AppState>,
) -> ApiResult<Json<UnverifiedResponse>> {
    let (players, scouts) = Account::count_unverified(&state.db).await?;

    Ok(Json(UnverifiedResponse { players, scouts }))
}

/// Analysis results for a video
///
/// Scores are produced by an external analysis step and recorded here
/// verbatim; nothing is computed server-side.
#[derive(Debug, Deserialize)]
pub struct RecordMetricsRequest {
    pub speed: Option<f64>,
    pub stamina: Option<f64>,
    pub accuracy: Option<f64>,
    pub overall_score: Option<f64>,
}

/// Records analysis results for a video and marks it ANALYZED
///
/// Metrics are append-only: each call adds a record, and the latest one is
/// what the analysis endpoints serve.
///
/// # Errors
///
/// - `404 Not Found`: Video does not exist
/// - `400 Bad Request`: The video's owner has no player profile
pub async fn record_video_metrics(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
    Json(req): Json<RecordMetricsRequest>,
) -> ApiResult<Json<PerformanceMetrics>> {
    let video = UploadedVideo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    // URL registrations may predate the profile; resolve it fresh
    let profile_id = match video.player_profile_id {
        Some(profile_id) => profile_id,
        None => PlayerProfile::find_by_account(&state.db, video.account_id)
            .await?
            .map(|p| p.id)
            .ok_or_else(|| {
                ApiError::BadRequest(
                    "The video's owner has no player profile to attach metrics to".to_string(),
                )
            })?,
    };

    let metrics = PerformanceMetrics::create(
        &state.db,
        CreateMetrics {
            player_profile_id: profile_id,
            video_id: Some(video.id),
            speed: req.speed,
            stamina: req.stamina,
            accuracy: req.accuracy,
            overall_score: req.overall_score,
        },
    )
    .await?;

    UploadedVideo::mark_analyzed(&state.db, video.id).await?;

    Ok(Json(metrics))
}
