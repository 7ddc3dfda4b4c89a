/// Google Drive storage manager
///
/// Owns the OAuth2 credential lifecycle for the Drive account videos are
/// uploaded to, and the file operations built on top of it. One instance
/// lives in `AppState` and is shared across requests.
///
/// # Credential lifecycle
///
/// - Initialization is lazy and single-flight (`tokio::sync::OnceCell`):
///   the client triple (id, secret, redirect URI) is validated on first
///   use, so the server boots without Drive configured and only upload
///   routes fail.
/// - A configured refresh token seeds the manager as ready; the access
///   token is minted on demand.
/// - Authenticated operations retry exactly once after an expiry-type
///   failure: refresh, then repeat the original request. If the refresh
///   itself fails, the *original* error is surfaced. The policy is a
///   plain attempt sequence, never recursion.
/// - Concurrent refreshes are harmless: last writer wins and both tokens
///   remain valid upstream.

use std::future::Future;
use std::path::Path;

use serde::Deserialize;
use tokio::sync::{OnceCell, RwLock};
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::{info, warn};
use url::Url;

use crate::config::DriveConfig;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_ENDPOINT: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id,name,webViewLink";
const FILES_ENDPOINT: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Error type for remote storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Drive OAuth client is not configured
    #[error("Storage not configured: {0}")]
    NotConfigured(String),

    /// No usable credentials (no token, or token rejected)
    #[error("Storage not authorized: {0}")]
    NotAuthorized(String),

    /// Drive or the token endpoint failed
    #[error("Upstream storage error: {0}")]
    Upstream(String),

    /// Local file I/O failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether this failure indicates an expired or revoked access token,
    /// the only class the bounded retry applies to
    pub fn is_credential_expiry(&self) -> bool {
        matches!(self, StorageError::NotAuthorized(_))
    }
}

/// Validated OAuth client, produced once by lazy initialization
#[derive(Debug, Clone)]
struct OAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

/// Token pair held in memory
#[derive(Debug, Clone, Default)]
struct TokenSet {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Uploaded file metadata returned by Drive
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    /// Drive file ID
    pub id: String,

    /// Stored file name
    pub name: String,

    /// Browser viewing link
    #[serde(rename = "webViewLink")]
    pub web_view_link: Option<String>,
}

/// Result of the operator consent flow, echoed back in the callback
#[derive(Debug, Clone)]
pub struct ExchangedTokens {
    /// Refresh token to persist into the environment, if Google issued one
    pub refresh_token: Option<String>,
}

/// Google Drive storage manager
pub struct DriveStorage {
    config: DriveConfig,
    http: reqwest::Client,
    client: OnceCell<OAuthClient>,
    tokens: RwLock<TokenSet>,
}

impl DriveStorage {
    /// Creates an uninitialized manager
    ///
    /// A configured refresh token is seeded immediately so
    /// `has_valid_credentials` reports ready without a consent round-trip.
    pub fn new(config: DriveConfig) -> Self {
        let tokens = TokenSet {
            access_token: None,
            refresh_token: config.refresh_token.clone(),
        };

        Self {
            config,
            http: reqwest::Client::new(),
            client: OnceCell::new(),
            tokens: RwLock::new(tokens),
        }
    }

    /// Lazily validates and returns the OAuth client
    ///
    /// Single-flight: concurrent first callers share one validation. A
    /// missing variable is terminal, reported on every subsequent call.
    async fn oauth_client(&self) -> Result<&OAuthClient, StorageError> {
        self.client
            .get_or_try_init(|| async {
                let client_id = self.config.client_id.clone().ok_or_else(|| {
                    StorageError::NotConfigured("GOOGLE_CLIENT_ID is not set".to_string())
                })?;
                let client_secret = self.config.client_secret.clone().ok_or_else(|| {
                    StorageError::NotConfigured("GOOGLE_CLIENT_SECRET is not set".to_string())
                })?;
                let redirect_uri = self.config.redirect_uri.clone().ok_or_else(|| {
                    StorageError::NotConfigured("GOOGLE_REDIRECT_URI is not set".to_string())
                })?;

                info!("Google Drive OAuth client initialized");
                Ok(OAuthClient {
                    client_id,
                    client_secret,
                    redirect_uri,
                })
            })
            .await
    }

    /// Whether the OAuth client variables are all present
    pub fn is_configured(&self) -> bool {
        self.config.client_id.is_some()
            && self.config.client_secret.is_some()
            && self.config.redirect_uri.is_some()
    }

    /// Whether the manager holds credentials usable for uploads
    pub async fn has_valid_credentials(&self) -> bool {
        if !self.is_configured() {
            return false;
        }
        let tokens = self.tokens.read().await;
        tokens.access_token.is_some() || tokens.refresh_token.is_some()
    }

    /// Builds the operator consent URL
    ///
    /// `access_type=offline` with `prompt=consent` guarantees Google
    /// issues a refresh token on every exchange.
    pub async fn authorization_url(&self) -> Result<String, StorageError> {
        let client = self.oauth_client().await?;

        let mut url = Url::parse(AUTH_ENDPOINT)
            .map_err(|e| StorageError::Upstream(format!("Invalid auth endpoint: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("client_id", &client.client_id)
            .append_pair("redirect_uri", &client.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", DRIVE_SCOPE)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");

        Ok(url.into())
    }

    /// Exchanges an authorization code for a token pair
    ///
    /// Stores both tokens and returns the refresh token so the operator
    /// can persist it into the environment.
    pub async fn exchange_code(&self, code: &str) -> Result<ExchangedTokens, StorageError> {
        let client = self.oauth_client().await?;

        let params = [
            ("code", code),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
            ("redirect_uri", client.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self.token_request(&params).await?;

        let mut tokens = self.tokens.write().await;
        tokens.access_token = Some(response.access_token);
        if response.refresh_token.is_some() {
            tokens.refresh_token = response.refresh_token.clone();
        }

        info!("Exchanged authorization code for Drive tokens");
        Ok(ExchangedTokens {
            refresh_token: response.refresh_token,
        })
    }

    /// Mints a fresh access token from the stored refresh token
    ///
    /// Last writer wins under concurrency; every minted token is valid.
    pub async fn refresh(&self) -> Result<(), StorageError> {
        let client = self.oauth_client().await?;

        let refresh_token = {
            let tokens = self.tokens.read().await;
            tokens.refresh_token.clone().ok_or_else(|| {
                StorageError::NotAuthorized("No refresh token available".to_string())
            })?
        };

        let params = [
            ("refresh_token", refresh_token.as_str()),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self.token_request(&params).await?;

        let mut tokens = self.tokens.write().await;
        tokens.access_token = Some(response.access_token);
        if response.refresh_token.is_some() {
            tokens.refresh_token = response.refresh_token;
        }

        info!("Refreshed Drive access token");
        Ok(())
    }

    /// Posts to the token endpoint and decodes the response
    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, StorageError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(params)
            .send()
            .await
            .map_err(|e| StorageError::Upstream(format!("Token endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED || body.contains("invalid_grant") {
                return Err(StorageError::NotAuthorized(format!(
                    "Token request rejected ({}): {}",
                    status, body
                )));
            }
            return Err(StorageError::Upstream(format!(
                "Token request failed ({}): {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| StorageError::Upstream(format!("Malformed token response: {}", e)))
    }

    /// Returns a usable access token, minting one from the refresh token
    /// if none is held
    async fn access_token(&self) -> Result<String, StorageError> {
        if let Some(token) = self.tokens.read().await.access_token.clone() {
            return Ok(token);
        }

        self.refresh().await?;

        self.tokens
            .read()
            .await
            .access_token
            .clone()
            .ok_or_else(|| StorageError::NotAuthorized("No access token after refresh".to_string()))
    }

    /// Drops the held access token so the next operation refreshes
    async fn invalidate_access_token(&self) {
        self.tokens.write().await.access_token = None;
    }

    /// Uploads a local video file to Drive
    ///
    /// Streams the file as a multipart upload, naming it `file_name` and
    /// placing it in the configured folder when one is set. Retries once
    /// after a credential-expiry failure.
    pub async fn upload_video(
        &self,
        path: &Path,
        file_name: &str,
    ) -> Result<DriveFile, StorageError> {
        self.oauth_client().await?;

        retry_once_on_expiry(
            || self.try_upload(path, file_name),
            || self.refresh_after_expiry(),
        )
        .await
    }

    /// Single upload attempt with the currently-held credentials
    async fn try_upload(&self, path: &Path, file_name: &str) -> Result<DriveFile, StorageError> {
        let token = self.access_token().await?;

        let mut metadata = serde_json::json!({ "name": file_name });
        if let Some(folder_id) = &self.config.folder_id {
            metadata["parents"] = serde_json::json!([folder_id]);
        }

        let file = tokio::fs::File::open(path).await?;
        let stream = FramedRead::new(file, BytesCodec::new());
        let body = reqwest::Body::wrap_stream(stream);

        let metadata_part = reqwest::multipart::Part::text(metadata.to_string())
            .mime_str("application/json")
            .map_err(|e| StorageError::Upstream(format!("Invalid metadata part: {}", e)))?;
        let file_part = reqwest::multipart::Part::stream(body)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| StorageError::Upstream(format!("Invalid file part: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("metadata", metadata_part)
            .part("file", file_part);

        let response = self
            .http
            .post(UPLOAD_ENDPOINT)
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Upstream(format!("Drive unreachable: {}", e)))?;

        self.decode_drive_response(response).await
    }

    /// Deletes a file from Drive by ID, with the same bounded retry
    pub async fn delete_file(&self, file_id: &str) -> Result<(), StorageError> {
        self.oauth_client().await?;

        let url = format!("{}/{}", FILES_ENDPOINT, file_id);

        retry_once_on_expiry(
            || async {
                let token = self.access_token().await?;
                let response = self
                    .http
                    .delete(&url)
                    .bearer_auth(&token)
                    .send()
                    .await
                    .map_err(|e| StorageError::Upstream(format!("Drive unreachable: {}", e)))?;

                let status = response.status();
                if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
                    return Ok(());
                }

                let body = response.text().await.unwrap_or_default();
                if status == reqwest::StatusCode::UNAUTHORIZED || body.contains("invalid_grant") {
                    Err(StorageError::NotAuthorized(format!(
                        "Drive delete rejected ({}): {}",
                        status, body
                    )))
                } else {
                    Err(StorageError::Upstream(format!(
                        "Drive delete failed ({}): {}",
                        status, body
                    )))
                }
            },
            || self.refresh_after_expiry(),
        )
        .await
    }

    /// Grants public read access to an uploaded file, with the same
    /// bounded retry
    ///
    /// Best-effort: callers treat a failure as non-fatal and log it.
    pub async fn make_public(&self, file_id: &str) -> Result<(), StorageError> {
        self.oauth_client().await?;

        let url = format!("{}/{}/permissions", FILES_ENDPOINT, file_id);
        let body = serde_json::json!({ "role": "reader", "type": "anyone" });

        retry_once_on_expiry(
            || async {
                let token = self.access_token().await?;
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(&token)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| StorageError::Upstream(format!("Drive unreachable: {}", e)))?;

                let status = response.status();
                if status.is_success() {
                    return Ok(());
                }

                let text = response.text().await.unwrap_or_default();
                if status == reqwest::StatusCode::UNAUTHORIZED || text.contains("invalid_grant") {
                    Err(StorageError::NotAuthorized(format!(
                        "Permission insert rejected ({}): {}",
                        status, text
                    )))
                } else {
                    Err(StorageError::Upstream(format!(
                        "Permission insert failed ({}): {}",
                        status, text
                    )))
                }
            },
            || self.refresh_after_expiry(),
        )
        .await
    }

    /// Refresh step of the retry policy: clear the stale token first so
    /// the retry attempt picks up the minted one
    async fn refresh_after_expiry(&self) -> Result<(), StorageError> {
        self.invalidate_access_token().await;
        self.refresh().await
    }

    /// Decodes a Drive file-resource response, classifying auth failures
    async fn decode_drive_response(
        &self,
        response: reqwest::Response,
    ) -> Result<DriveFile, StorageError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED || body.contains("invalid_grant") {
                return Err(StorageError::NotAuthorized(format!(
                    "Drive rejected credentials ({}): {}",
                    status, body
                )));
            }
            return Err(StorageError::Upstream(format!(
                "Drive request failed ({}): {}",
                status, body
            )));
        }

        response
            .json::<DriveFile>()
            .await
            .map_err(|e| StorageError::Upstream(format!("Malformed Drive response: {}", e)))
    }
}

/// Runs an authenticated operation with the bounded retry policy
///
/// At most two attempts. The refresh runs only after a credential-expiry
/// failure; if the refresh fails, the original operation error is
/// returned, not the refresh error.
pub(crate) async fn retry_once_on_expiry<T, Op, OpFut, Re, ReFut>(
    op: Op,
    refresh: Re,
) -> Result<T, StorageError>
where
    Op: Fn() -> OpFut,
    OpFut: Future<Output = Result<T, StorageError>>,
    Re: FnOnce() -> ReFut,
    ReFut: Future<Output = Result<(), StorageError>>,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(original) if original.is_credential_expiry() => {
            if let Err(refresh_err) = refresh().await {
                warn!("Token refresh failed during retry: {}", refresh_err);
                return Err(original);
            }
            op().await
        }
        Err(other) => Err(other),
    }
}

/// Builds the browser embed URL for a Drive file
pub fn embed_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/preview", file_id)
}

/// Extracts a Drive file ID from a viewing or embed URL
///
/// Understands the `/file/d/{id}/...` path shape and the `id=` query
/// parameter. Used as a deletion fallback for videos persisted before
/// drive_file_id was recorded.
pub fn extract_file_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    if let Some(segments) = parsed.path_segments() {
        let segments: Vec<&str> = segments.collect();
        if let Some(pos) = segments.iter().position(|s| *s == "d") {
            if let Some(id) = segments.get(pos + 1) {
                if !id.is_empty() {
                    return Some((*id).to_string());
                }
            }
        }
    }

    parsed
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn config(with_refresh: bool) -> DriveConfig {
        DriveConfig {
            client_id: Some("client-id".to_string()),
            client_secret: Some("client-secret".to_string()),
            redirect_uri: Some("http://localhost:8080/v1/auth/google/callback".to_string()),
            refresh_token: with_refresh.then(|| "refresh-token".to_string()),
            folder_id: None,
        }
    }

    #[tokio::test]
    async fn test_authorization_url_shape() {
        let storage = DriveStorage::new(config(false));
        let url = storage.authorization_url().await.unwrap();

        assert!(url.starts_with(AUTH_ENDPOINT));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
    }

    #[tokio::test]
    async fn test_missing_config_is_terminal() {
        let storage = DriveStorage::new(DriveConfig::default());

        let err = storage.authorization_url().await.unwrap_err();
        assert!(matches!(err, StorageError::NotConfigured(_)));

        // Subsequent calls report the same failure
        let err = storage.authorization_url().await.unwrap_err();
        assert!(matches!(err, StorageError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_configured_refresh_token_counts_as_credentials() {
        let storage = DriveStorage::new(config(true));
        assert!(storage.has_valid_credentials().await);

        let storage = DriveStorage::new(config(false));
        assert!(!storage.has_valid_credentials().await);
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_refresh() {
        let attempts = Arc::new(AtomicU32::new(0));
        let refreshes = Arc::new(AtomicU32::new(0));

        let op_attempts = attempts.clone();
        let result = retry_once_on_expiry(
            move || {
                let attempts = op_attempts.clone();
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(StorageError::NotAuthorized("expired".to_string()))
                    } else {
                        Ok(42)
                    }
                }
            },
            {
                let refreshes = refreshes.clone();
                move || {
                    refreshes.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_is_bounded_to_one() {
        let attempts = Arc::new(AtomicU32::new(0));

        let op_attempts = attempts.clone();
        let result: Result<u32, _> = retry_once_on_expiry(
            move || {
                let attempts = op_attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(StorageError::NotAuthorized("still expired".to_string()))
                }
            },
            || async { Ok(()) },
        )
        .await;

        assert!(result.is_err());
        // Exactly two attempts, never more
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_failure_surfaces_original_error() {
        let result: Result<u32, _> = retry_once_on_expiry(
            || async { Err(StorageError::NotAuthorized("original failure".to_string())) },
            || async { Err(StorageError::Upstream("refresh exploded".to_string())) },
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("original failure"));
    }

    #[tokio::test]
    async fn test_non_expiry_errors_do_not_retry() {
        let attempts = Arc::new(AtomicU32::new(0));

        let op_attempts = attempts.clone();
        let result: Result<u32, _> = retry_once_on_expiry(
            move || {
                let attempts = op_attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(StorageError::Upstream("server error".to_string()))
                }
            },
            || async {
                panic!("refresh must not run for non-expiry errors");
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            embed_url("abc123"),
            "https://drive.google.com/file/d/abc123/preview"
        );
    }

    #[test]
    fn test_extract_file_id_from_path() {
        assert_eq!(
            extract_file_id("https://drive.google.com/file/d/abc123/preview"),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_file_id("https://drive.google.com/file/d/abc123/view?usp=sharing"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_extract_file_id_from_query() {
        assert_eq!(
            extract_file_id("https://drive.google.com/open?id=xyz789"),
            Some("xyz789".to_string())
        );
    }

    #[test]
    fn test_extract_file_id_rejects_garbage() {
        assert_eq!(extract_file_id("not a url"), None);
        assert_eq!(extract_file_id("https://example.com/video.mp4"), None);
    }
}
