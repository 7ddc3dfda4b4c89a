/// Video endpoints
///
/// The ingestion pipeline and the read/delete surface around it. Uploads
/// are gated behind `require_verified` *before* any storage work, so an
/// incomplete or unverified player never burns bandwidth or Drive quota.
///
/// # Endpoints
///
/// - `POST /v1/videos/upload` - Multipart file upload or JSON URL registration
/// - `GET /v1/videos` - Own videos
/// - `GET /v1/videos/all` - All visible videos (admin / verified scout)
/// - `GET /v1/videos/:id` - Single video, access-matrix gated
/// - `GET /v1/videos/:id/analysis` - Latest performance metrics for the video
/// - `DELETE /v1/videos/:id` - Owner-only delete with best-effort remote cleanup

use std::path::Path;

use axum::{
    extract::{FromRequest, Multipart, Path as UrlPath, Query, Request, State},
    http::header::CONTENT_TYPE,
    http::HeaderMap,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    storage::{drive, temp},
};
use fieldscout_shared::{
    auth::{access, gate, middleware::AuthContext},
    models::{
        account::{Account, AccountRole, VerificationStatus},
        metrics::PerformanceMetrics,
        player_profile::PlayerProfile,
        video::{CreateUploadedVideo, UploadedVideo},
    },
};

/// JSON upload body: register an externally hosted video by URL
#[derive(Debug, Deserialize)]
pub struct UrlUploadRequest {
    /// Link to the hosted video
    pub video_url: String,
}

/// Pagination query for listing endpoints
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Analysis response: the video plus its latest metrics
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub video: UploadedVideo,
    pub metrics: Option<PerformanceMetrics>,
}

/// Uploads a video
///
/// Dispatches on Content-Type: `multipart/form-data` runs the full
/// ingestion pipeline (stage locally, upload to Drive, request public
/// read, persist); `application/json` registers an external URL directly
/// and never touches the credential manager.
///
/// # Errors
///
/// - `403 Forbidden`: Profile incomplete or account not verified
/// - `400 Bad Request`: Wrong MIME type, oversized upload, missing field
/// - `502 Bad Gateway`: Drive failed after the permitted retry
pub async fn upload_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    body: Request,
) -> ApiResult<Json<UploadedVideo>> {
    let account = super::current_account(&state, &auth).await?;

    // Gate before any storage work
    let has_profile = PlayerProfile::exists_for_account(&state.db, account.id).await?;
    gate::require_verified(&account, has_profile)?;

    let player_profile_id = PlayerProfile::find_by_account(&state.db, account.id)
        .await?
        .map(|p| p.id);

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(body, &state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed multipart request: {}", e)))?;
        ingest_multipart(&state, &account, player_profile_id, multipart).await
    } else if content_type.starts_with("application/json") {
        let Json(req): Json<UrlUploadRequest> = Json::from_request(body, &state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed JSON body: {}", e)))?;
        register_url(&state, &account, player_profile_id, req).await
    } else {
        Err(ApiError::BadRequest(
            "Expected multipart/form-data or application/json".to_string(),
        ))
    }
}

/// Multipart arm of the pipeline: stage, upload, persist
async fn ingest_multipart(
    state: &AppState,
    account: &Account,
    player_profile_id: Option<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadedVideo>> {
    let mut field = loop {
        match multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed multipart request: {}", e)))?
        {
            Some(field) if field.name() == Some("video") => break field,
            Some(_) => continue,
            None => return Err(ApiError::BadRequest("Missing 'video' field".to_string())),
        }
    };

    let content_type = field.content_type().map(|s| s.to_string());
    if !temp::is_allowed_mime(content_type.as_deref(), temp::VIDEO_MIME_TYPES) {
        return Err(ApiError::BadRequest(
            "Unsupported video format; expected MP4, MOV, AVI, MKV, or WEBM".to_string(),
        ));
    }

    let original_name = field.file_name().unwrap_or("video").to_string();
    let stored_name = temp::unique_file_name(&original_name);
    let dir = Path::new(&state.config.upload.dir).join("staging");

    // Guard removes the staged file on every exit path
    let (staged, bytes) = temp::stream_field_to_temp(
        &mut field,
        &dir,
        &stored_name,
        state.config.upload.max_video_bytes,
    )
    .await?;

    info!(
        account_id = %account.id,
        bytes,
        "Staged video upload, sending to Drive"
    );

    let uploaded = state.drive.upload_video(staged.path(), &stored_name).await?;

    // Public read is best-effort; a private video is still viewable by
    // its owner through Drive
    if let Err(e) = state.drive.make_public(&uploaded.id).await {
        warn!(file_id = %uploaded.id, "Failed to make video public: {}", e);
    }

    let video_url = uploaded
        .web_view_link
        .clone()
        .unwrap_or_else(|| drive::embed_url(&uploaded.id));

    let persisted = UploadedVideo::create(
        &state.db,
        CreateUploadedVideo {
            account_id: account.id,
            player_profile_id,
            video_url,
            drive_file_id: Some(uploaded.id.clone()),
        },
    )
    .await;

    match persisted {
        Ok(video) => Ok(Json(video)),
        Err(db_err) => {
            // Compensate: the remote object would otherwise be orphaned
            if let Err(e) = state.drive.delete_file(&uploaded.id).await {
                warn!(
                    file_id = %uploaded.id,
                    "Compensating Drive delete failed: {}", e
                );
            }
            Err(db_err.into())
        }
    }
}

/// JSON arm: persist an external URL directly
async fn register_url(
    state: &AppState,
    account: &Account,
    player_profile_id: Option<Uuid>,
    req: UrlUploadRequest,
) -> ApiResult<Json<UploadedVideo>> {
    let video_url = req.video_url.trim().to_string();
    if video_url.is_empty() {
        return Err(ApiError::BadRequest("video_url must not be empty".to_string()));
    }

    let video = UploadedVideo::create(
        &state.db,
        CreateUploadedVideo {
            account_id: account.id,
            player_profile_id,
            video_url,
            drive_file_id: None,
        },
    )
    .await?;

    Ok(Json(video))
}

/// Lists the authenticated account's own videos
pub async fn list_own_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<UploadedVideo>>> {
    let videos = UploadedVideo::list_by_account(&state.db, auth.account_id).await?;
    Ok(Json(videos))
}

/// Lists all videos visible to the requester
///
/// Admins see everything; verified scouts see videos owned by VERIFIED
/// players. Everyone else is refused.
pub async fn list_all_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<UploadedVideo>>> {
    let account = super::current_account(&state, &auth).await?;

    match account.role {
        AccountRole::Admin => {}
        AccountRole::Scout if account.verification_status == VerificationStatus::Verified => {}
        _ => {
            return Err(ApiError::Forbidden(
                "Only admins and verified scouts may browse all videos".to_string(),
            ))
        }
    }

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let videos = UploadedVideo::list_visible(&state.db, account.role, limit, offset).await?;
    Ok(Json(videos))
}

/// Fetches a single video, enforcing the access matrix
pub async fn get_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    UrlPath(id): UrlPath<Uuid>,
) -> ApiResult<Json<UploadedVideo>> {
    let (video, _) = fetch_video_checked(&state, &auth, id).await?;
    Ok(Json(video))
}

/// Fetches the latest metrics for a video
///
/// Prefers metrics recorded against this specific video; when none exist,
/// falls back to the player's newest metrics overall.
pub async fn get_video_analysis(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    UrlPath(id): UrlPath<Uuid>,
) -> ApiResult<Json<AnalysisResponse>> {
    let (video, _) = fetch_video_checked(&state, &auth, id).await?;

    let metrics = match PerformanceMetrics::latest_for_video(&state.db, video.id).await? {
        Some(metrics) => Some(metrics),
        None => match video.player_profile_id {
            Some(profile_id) => {
                PerformanceMetrics::latest_for_profile(&state.db, profile_id).await?
            }
            None => None,
        },
    };

    Ok(Json(AnalysisResponse { video, metrics }))
}

/// Deletes an owned video
///
/// Remote cleanup is best-effort: a Drive failure is logged and never
/// blocks the local delete. Falls back to parsing the file ID out of the
/// video URL when drive_file_id was not recorded.
pub async fn delete_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    UrlPath(id): UrlPath<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let video = UploadedVideo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    if video.account_id != auth.account_id {
        return Err(ApiError::Forbidden(
            "Only the owner may delete a video".to_string(),
        ));
    }

    let file_id = video
        .drive_file_id
        .clone()
        .or_else(|| drive::extract_file_id(&video.video_url));

    if let Some(file_id) = file_id {
        if let Err(e) = state.drive.delete_file(&file_id).await {
            warn!(video_id = %id, file_id, "Remote video delete failed: {}", e);
        }
    }

    UploadedVideo::delete(&state.db, id).await?;

    Ok(Json(serde_json::json!({ "message": "Video deleted" })))
}

/// Fetches a video and checks the requester may view it
async fn fetch_video_checked(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
) -> Result<(UploadedVideo, Account), ApiError> {
    let video = UploadedVideo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    let requester = super::current_account(state, auth).await?;
    let owner = Account::find_by_id(&state.db, video.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    if !access::can_view_video(&requester, &owner, video.account_id) {
        return Err(ApiError::Forbidden(
            "You do not have access to this video".to_string(),
        ));
    }

    Ok((video, owner))
}
