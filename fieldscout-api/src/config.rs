/// Configuration management for the API server
///
/// Loads configuration from environment variables into a type-safe struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: permissive)
/// - `JWT_SECRET`: Secret key for JWT signing (required, >= 32 bytes)
/// - `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` / `GOOGLE_REDIRECT_URI`:
///   Drive OAuth client; optional at startup, validated lazily on first
///   storage use
/// - `GOOGLE_REFRESH_TOKEN`: durable refresh token, optional
/// - `GOOGLE_DRIVE_FOLDER_ID`: target Drive folder, optional
/// - `UPLOAD_DIR`: scratch directory for uploads (default: uploads)
/// - `MAX_PICTURE_BYTES` / `MAX_VIDEO_BYTES` / `MAX_DOCUMENT_BYTES`: size
///   ceilings
/// - `RUST_LOG`: Log level (default: info)
///
/// # Example
///
/// ```no_run
/// use fieldscout_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

use fieldscout_shared::db::pool::DatabaseConfig;

/// Default profile picture ceiling: 5 MB
const DEFAULT_MAX_PICTURE_BYTES: u64 = 5 * 1024 * 1024;

/// Default video ceiling: 500 MB
const DEFAULT_MAX_VIDEO_BYTES: u64 = 500 * 1024 * 1024;

/// Default verification document ceiling: 10 MB per file
const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Google Drive OAuth configuration
    pub drive: DriveConfig,

    /// Upload handling configuration
    pub upload: UploadConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; empty means permissive
    pub cors_origins: Vec<String>,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: must be kept secret and at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Google Drive OAuth client configuration
///
/// Every field is optional at startup. The storage manager validates the
/// client triple (id, secret, redirect URI) on first use and fails with a
/// configuration error if any is missing; the server itself boots fine
/// without them so non-upload routes keep working.
#[derive(Debug, Clone, Default)]
pub struct DriveConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,

    /// Durable refresh token obtained via the consent flow
    pub refresh_token: Option<String>,

    /// Target folder for uploaded videos; None uploads to the Drive root
    pub folder_id: Option<String>,
}

/// Upload handling configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory for profile pictures and upload scratch files
    pub dir: String,

    /// Profile picture size ceiling in bytes
    pub max_picture_bytes: u64,

    /// Video size ceiling in bytes
    pub max_video_bytes: u64,

    /// Verification document size ceiling in bytes, per file
    pub max_document_bytes: u64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric
    /// variable fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let drive = DriveConfig {
            client_id: env::var("GOOGLE_CLIENT_ID").ok(),
            client_secret: env::var("GOOGLE_CLIENT_SECRET").ok(),
            redirect_uri: env::var("GOOGLE_REDIRECT_URI").ok(),
            refresh_token: env::var("GOOGLE_REFRESH_TOKEN").ok(),
            folder_id: env::var("GOOGLE_DRIVE_FOLDER_ID").ok(),
        };

        let upload = UploadConfig {
            dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            max_picture_bytes: env::var("MAX_PICTURE_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_PICTURE_BYTES.to_string())
                .parse::<u64>()?,
            max_video_bytes: env::var("MAX_VIDEO_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_VIDEO_BYTES.to_string())
                .parse::<u64>()?,
            max_document_bytes: env::var("MAX_DOCUMENT_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_DOCUMENT_BYTES.to_string())
                .parse::<u64>()?,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                ..Default::default()
            },
            jwt: JwtConfig { secret: jwt_secret },
            drive,
            upload,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                ..Default::default()
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            drive: DriveConfig::default(),
            upload: UploadConfig {
                dir: "uploads".to_string(),
                max_picture_bytes: DEFAULT_MAX_PICTURE_BYTES,
                max_video_bytes: DEFAULT_MAX_VIDEO_BYTES,
                max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_default_ceilings() {
        let config = test_config();
        assert_eq!(config.upload.max_picture_bytes, 5 * 1024 * 1024);
        assert_eq!(config.upload.max_video_bytes, 500 * 1024 * 1024);
        assert_eq!(config.upload.max_document_bytes, 10 * 1024 * 1024);
    }
}
