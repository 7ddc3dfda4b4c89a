/// Own-profile endpoints
///
/// # Endpoints
///
/// - `GET /v1/user/profile` - Fetch the authenticated account and player profile
/// - `PUT /v1/user/profile` - Update contact fields and player details
/// - `GET /v1/user/profile-completion` - Completion percentage report
/// - `POST /v1/user/profile/picture` - Upload a profile picture (5 MB cap)
/// - `POST /v1/user/profile/documents` - Upload verification documents
///   (10 MB per file, image or PDF)

use std::path::Path;

use axum::{extract::Multipart, extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    storage::temp,
};
use fieldscout_shared::{
    auth::{completion, middleware::AuthContext},
    models::{
        account::{Account, AccountRole, UpdateAccount},
        player_profile::{PlayerProfile, UpsertPlayerProfile},
    },
};

/// Subdirectory of the upload dir holding profile pictures
const PICTURE_SUBDIR: &str = "profile-pictures";

/// Subdirectory of the upload dir holding verification documents
const DOCUMENT_SUBDIR: &str = "documents";

/// Most documents accepted in one request
pub const MAX_DOCUMENT_FILES: usize = 5;

/// Profile response: the account plus its player profile, if any
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub account: Account,
    pub player_profile: Option<PlayerProfile>,
}

/// Profile update request
///
/// Absent fields are left untouched; provided fields are written.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 32, message = "Phone number must be at most 32 characters"))]
    pub phone_number: Option<String>,

    #[validate(length(max = 8, message = "Country code must be at most 8 characters"))]
    pub country_code: Option<String>,

    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub club_name: Option<String>,

    #[validate(length(max = 100, message = "Document number must be at most 100 characters"))]
    pub document_number: Option<String>,

    /// Replaces the recorded document URL list wholesale
    pub document_photos: Option<Vec<String>>,

    /// Player details; creates the player profile record if missing
    pub player_profile: Option<UpsertPlayerProfile>,
}

/// Completion report response
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    /// Rounded percentage over the fixed ten-field set
    pub percentage: u8,

    /// Whether the profile is fully complete
    pub complete: bool,
}

/// Fetches the authenticated account's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let account = super::current_account(&state, &auth).await?;
    let player_profile = PlayerProfile::find_by_account(&state.db, account.id).await?;

    Ok(Json(ProfileResponse {
        account,
        player_profile,
    }))
}

/// Updates contact fields and, for players, the player profile record
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    req.validate()?;

    let account = super::current_account(&state, &auth).await?;

    if req.player_profile.is_some() && account.role != AccountRole::Player {
        return Err(ApiError::BadRequest(
            "Only players have a player profile".to_string(),
        ));
    }

    let data = UpdateAccount {
        name: req.name.map(Some),
        phone_number: req.phone_number.map(Some),
        country_code: req.country_code.map(Some),
        city: req.city.map(Some),
        state: req.state.map(Some),
        country: req.country.map(Some),
        postal_code: req.postal_code.map(Some),
        profile_picture: None,
        club_name: req.club_name.map(Some),
        document_number: req.document_number.map(Some),
        document_photos: req.document_photos,
    };

    let account = Account::update(&state.db, account.id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    let player_profile = match req.player_profile {
        Some(details) => Some(PlayerProfile::upsert(&state.db, account.id, details).await?),
        None => PlayerProfile::find_by_account(&state.db, account.id).await?,
    };

    Ok(Json(ProfileResponse {
        account,
        player_profile,
    }))
}

/// Reports profile completion for the authenticated account
pub async fn profile_completion(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<CompletionResponse>> {
    let account = super::current_account(&state, &auth).await?;
    let has_profile = PlayerProfile::exists_for_account(&state.db, account.id).await?;

    let percentage = completion::completion_percentage(&account, has_profile);

    Ok(Json(CompletionResponse {
        percentage,
        complete: percentage == 100,
    }))
}

/// Uploads a profile picture
///
/// Accepts a multipart `picture` field (JPEG/PNG/WEBP, 5 MB cap), stores
/// it under the upload directory, and removes the previous picture
/// best-effort.
pub async fn upload_picture(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> ApiResult<Json<ProfileResponse>> {
    let account = super::current_account(&state, &auth).await?;

    let mut field = loop {
        match multipart.next_field().await.map_err(|e| {
            ApiError::BadRequest(format!("Malformed multipart request: {}", e))
        })? {
            Some(field) if field.name() == Some("picture") => break field,
            Some(_) => continue,
            None => {
                return Err(ApiError::BadRequest(
                    "Missing 'picture' field".to_string(),
                ))
            }
        }
    };

    let content_type = field.content_type().map(|s| s.to_string());
    if !temp::is_allowed_mime(content_type.as_deref(), temp::IMAGE_MIME_TYPES) {
        return Err(ApiError::BadRequest(
            "Profile pictures must be JPEG, PNG, or WEBP".to_string(),
        ));
    }

    let original_name = field.file_name().unwrap_or("picture").to_string();
    let stored_name = temp::unique_file_name(&original_name);
    let dir = Path::new(&state.config.upload.dir).join(PICTURE_SUBDIR);

    let (staged, _bytes) = temp::stream_field_to_temp(
        &mut field,
        &dir,
        &stored_name,
        state.config.upload.max_picture_bytes,
    )
    .await?;

    let picture_url = format!("/uploads/{}/{}", PICTURE_SUBDIR, stored_name);
    let previous = account.profile_picture.clone();

    let updated = Account::update(
        &state.db,
        account.id,
        UpdateAccount {
            profile_picture: Some(Some(picture_url)),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    // The staged file is now the live picture
    staged.keep();

    // Old picture removal is best-effort
    if let Some(old_url) = previous {
        if let Some(old_name) = old_url.rsplit('/').next() {
            let old_path = dir.join(old_name);
            if let Err(e) = tokio::fs::remove_file(&old_path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %old_path.display(), "Failed to remove old picture: {}", e);
                }
            }
        }
    }

    let player_profile = PlayerProfile::find_by_account(&state.db, updated.id).await?;

    Ok(Json(ProfileResponse {
        account: updated,
        player_profile,
    }))
}

/// Uploads verification documents
///
/// Accepts multipart `document` file fields (JPEG/PNG/WEBP/PDF, 10 MB per
/// file, at most five per request) plus an optional `document_number` text
/// field. Stored files are appended to the account's document URL list;
/// nothing is written to the account until every file has staged cleanly.
pub async fn upload_documents(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> ApiResult<Json<ProfileResponse>> {
    let account = super::current_account(&state, &auth).await?;

    let dir = Path::new(&state.config.upload.dir).join(DOCUMENT_SUBDIR);
    let mut staged: Vec<(temp::TempUpload, String)> = Vec::new();
    let mut document_number: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart request: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("document_number") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Malformed field: {}", e)))?;
                if !value.trim().is_empty() {
                    document_number = Some(value);
                }
            }
            Some("document") => {
                if staged.len() >= MAX_DOCUMENT_FILES {
                    return Err(ApiError::BadRequest(format!(
                        "At most {} documents per request",
                        MAX_DOCUMENT_FILES
                    )));
                }

                let content_type = field.content_type().map(|s| s.to_string());
                if !temp::is_allowed_mime(content_type.as_deref(), temp::DOCUMENT_MIME_TYPES) {
                    return Err(ApiError::BadRequest(
                        "Documents must be JPEG, PNG, WEBP, or PDF".to_string(),
                    ));
                }

                let original_name = field.file_name().unwrap_or("document").to_string();
                let stored_name = temp::unique_file_name(&original_name);

                let (guard, _bytes) = temp::stream_field_to_temp(
                    &mut field,
                    &dir,
                    &stored_name,
                    state.config.upload.max_document_bytes,
                )
                .await?;

                let url = format!("/uploads/{}/{}", DOCUMENT_SUBDIR, stored_name);
                staged.push((guard, url));
            }
            _ => continue,
        }
    }

    if staged.is_empty() && document_number.is_none() {
        return Err(ApiError::BadRequest(
            "Missing 'document' field".to_string(),
        ));
    }

    let mut photos = account.document_photos.clone();
    photos.extend(staged.iter().map(|(_, url)| url.clone()));

    let updated = Account::update(
        &state.db,
        account.id,
        UpdateAccount {
            document_number: document_number.map(Some),
            document_photos: Some(photos),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    // The staged files are now the live documents
    for (guard, _) in staged {
        guard.keep();
    }

    let player_profile = PlayerProfile::find_by_account(&state.db, updated.id).await?;

    Ok(Json(ProfileResponse {
        account: updated,
        player_profile,
    }))
}
