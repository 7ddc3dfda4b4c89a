/// Scout review endpoints
///
/// Every route here sits behind the verified-scout guard, so handlers can
/// assume a verified SCOUT caller. Players are only ever surfaced once
/// VERIFIED.
///
/// # Endpoints
///
/// - `GET /v1/scout/players` - Browse verified players
/// - `GET /v1/scout/players/:id` - Single verified player with metrics
/// - `POST /v1/scout/videos/:id/select` - Record or update an interest level
/// - `GET /v1/scout/videos/:id/selections` - All selections on a video
/// - `GET /v1/scout/selections` - The scout's own selections

use axum::{
    extract::{Path as UrlPath, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use fieldscout_shared::{
    auth::middleware::AuthContext,
    models::{
        account::{Account, AccountRole, VerificationStatus},
        metrics::PerformanceMetrics,
        player_profile::PlayerProfile,
        selection::{SelectionInput, SelectionStatus, VideoSelection},
        video::UploadedVideo,
    },
};

/// Player listing query
#[derive(Debug, Deserialize)]
pub struct PlayerListQuery {
    /// Search term over name and email
    pub search: Option<String>,

    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated player listing response
#[derive(Debug, Serialize)]
pub struct PlayerListResponse {
    pub players: Vec<Account>,
    pub total: i64,
}

/// Single player detail response
#[derive(Debug, Serialize)]
pub struct PlayerDetailResponse {
    pub account: Account,
    pub player_profile: Option<PlayerProfile>,
    pub metrics: Option<PerformanceMetrics>,
    pub videos: Vec<UploadedVideo>,
}

/// Selection request
#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    /// Target status (case-insensitive); defaults to INTERESTED
    pub status: Option<String>,

    /// Club the scout is selecting for
    pub club_name: Option<String>,

    /// Free-form comments
    pub comments: Option<String>,
}

/// Lists verified players
pub async fn list_players(
    State(state): State<AppState>,
    Query(query): Query<PlayerListQuery>,
) -> ApiResult<Json<PlayerListResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    let search = query.search.as_deref();

    let players = Account::list_by_role(
        &state.db,
        AccountRole::Player,
        Some(VerificationStatus::Verified),
        search,
        limit,
        offset,
    )
    .await?;

    let total = Account::count_by_role(
        &state.db,
        AccountRole::Player,
        Some(VerificationStatus::Verified),
        search,
    )
    .await?;

    Ok(Json(PlayerListResponse { players, total }))
}

/// Fetches a single verified player with profile, metrics, and videos
///
/// An unverified player, or a non-player account, is reported as absent.
pub async fn get_player(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> ApiResult<Json<PlayerDetailResponse>> {
    let account = Account::find_by_id_and_role(&state.db, id, AccountRole::Player)
        .await?
        .filter(|a| a.verification_status == VerificationStatus::Verified)
        .ok_or_else(|| ApiError::NotFound("Player not found".to_string()))?;

    let player_profile = PlayerProfile::find_by_account(&state.db, account.id).await?;

    let metrics = match &player_profile {
        Some(profile) => PerformanceMetrics::latest_for_profile(&state.db, profile.id).await?,
        None => None,
    };

    let videos = UploadedVideo::list_by_account(&state.db, account.id).await?;

    Ok(Json(PlayerDetailResponse {
        account,
        player_profile,
        metrics,
        videos,
    }))
}

/// Records or updates the scout's interest in a video
///
/// One record per (video, scout): repeated calls update in place. An
/// unknown status is rejected before anything is written.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown status value
/// - `404 Not Found`: Video missing, or its owner not verified
pub async fn select_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    UrlPath(id): UrlPath<Uuid>,
    Json(req): Json<SelectionRequest>,
) -> ApiResult<Json<VideoSelection>> {
    let status =
        SelectionStatus::normalize(req.status.as_deref()).map_err(ApiError::BadRequest)?;

    let video = visible_video(&state, id).await?;

    let selection = VideoSelection::upsert(
        &state.db,
        video.id,
        auth.account_id,
        SelectionInput {
            status,
            club_name: req.club_name,
            comments: req.comments,
        },
    )
    .await?;

    Ok(Json(selection))
}

/// Lists the authenticated scout's own selections
pub async fn my_selections(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<VideoSelection>>> {
    let selections = VideoSelection::list_by_scout(&state.db, auth.account_id).await?;
    Ok(Json(selections))
}

/// Lists all selections recorded on a video
pub async fn list_selections(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> ApiResult<Json<Vec<VideoSelection>>> {
    let video = visible_video(&state, id).await?;

    let selections = VideoSelection::list_by_video(&state.db, video.id).await?;
    Ok(Json(selections))
}

/// Fetches a video visible to scouts: it must exist and its owner must be
/// VERIFIED; both failures look identical to the caller
async fn visible_video(state: &AppState, id: Uuid) -> Result<UploadedVideo, ApiError> {
    let video = UploadedVideo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    let owner = Account::find_by_id(&state.db, video.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    if owner.verification_status != VerificationStatus::Verified {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }

    Ok(video)
}
