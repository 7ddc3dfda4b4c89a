/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with
/// all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use fieldscout_api::{app::AppState, config::Config, storage::drive::DriveStorage};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let drive = Arc::new(DriveStorage::new(config.drive.clone()));
/// let state = AppState::new(pool, config, drive);
/// let app = fieldscout_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, storage::drive::DriveStorage};
use fieldscout_shared::auth::middleware::create_jwt_middleware;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Arc
/// internally, so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Google Drive storage manager (lazy-initialized)
    pub drive: Arc<DriveStorage>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, drive: Arc<DriveStorage>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            drive,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /uploads/*                       # Static profile pictures (public)
/// ├── /v1/
/// │   ├── /auth/                       # Identity lifecycle (public)
/// │   │   ├── POST /signup, /login, /logout, /refresh
/// │   │   └── GET  /google, /google/callback, /google/status
/// │   ├── /user/                       # Own profile (JWT)
/// │   │   ├── GET/PUT /profile
/// │   │   ├── GET  /profile-completion
/// │   │   └── POST /profile/picture, /profile/documents
/// │   ├── /videos/                     # Video lifecycle (JWT)
/// │   │   ├── POST /upload
/// │   │   ├── GET  /, /all, /:id, /:id/analysis
/// │   │   └── DELETE /:id
/// │   ├── /scout/                      # Review surface (JWT + verified scout)
/// │   │   ├── GET  /players, /players/:id
/// │   │   ├── POST /videos/:id/select
/// │   │   └── GET  /videos/:id/selections, /selections
/// │   └── /admin/                      # Verification (JWT + admin)
/// │       ├── PUT /players/:id/verify, /scouts/:id/verify
/// │       ├── GET /players, /scouts, /unverified
/// │       └── POST /videos/:id/metrics
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication and role guards (per-nest)
pub fn build_router(state: AppState) -> Router {
    use crate::middleware::guards;
    use crate::routes;

    // One JWT layer instance shared by every authenticated nest
    let jwt_layer =
        axum::middleware::from_fn(create_jwt_middleware(state.config.jwt.secret.clone()));

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/google", get(routes::auth::google_consent))
        .route("/google/callback", get(routes::auth::google_callback))
        .route("/google/status", get(routes::auth::google_status));

    // Profile routes (JWT)
    let user_routes = Router::new()
        .route(
            "/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route(
            "/profile-completion",
            get(routes::profile::profile_completion),
        )
        .route(
            "/profile/picture",
            post(routes::profile::upload_picture)
                .layer(DefaultBodyLimit::max(picture_body_limit(&state))),
        )
        .route(
            "/profile/documents",
            post(routes::profile::upload_documents)
                .layer(DefaultBodyLimit::max(document_body_limit(&state))),
        )
        .layer(jwt_layer.clone());

    // Video routes (JWT; gates and the access matrix are enforced per
    // handler because they depend on the target resource)
    let video_routes = Router::new()
        .route(
            "/upload",
            post(routes::videos::upload_video)
                .layer(DefaultBodyLimit::max(video_body_limit(&state))),
        )
        .route("/", get(routes::videos::list_own_videos))
        .route("/all", get(routes::videos::list_all_videos))
        .route("/:id", get(routes::videos::get_video))
        .route("/:id/analysis", get(routes::videos::get_video_analysis))
        .route("/:id", delete(routes::videos::delete_video))
        .layer(jwt_layer.clone());

    // Scout routes (JWT + verified scout)
    let scout_routes = Router::new()
        .route("/players", get(routes::scout::list_players))
        .route("/players/:id", get(routes::scout::get_player))
        .route("/videos/:id/select", post(routes::scout::select_video))
        .route(
            "/videos/:id/selections",
            get(routes::scout::list_selections),
        )
        .route("/selections", get(routes::scout::my_selections))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            guards::require_verified_scout,
        ))
        .layer(jwt_layer.clone());

    // Admin routes (JWT + admin)
    let admin_routes = Router::new()
        .route("/players/:id/verify", put(routes::admin::verify_player))
        .route("/scouts/:id/verify", put(routes::admin::verify_scout))
        .route("/players", get(routes::admin::list_players))
        .route("/scouts", get(routes::admin::list_scouts))
        .route("/unverified", get(routes::admin::unverified_counts))
        .route(
            "/videos/:id/metrics",
            post(routes::admin::record_video_metrics),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            guards::require_admin,
        ))
        .layer(jwt_layer.clone());

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .nest("/videos", video_routes)
        .nest("/scout", scout_routes)
        .nest("/admin", admin_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.is_empty()
        || state.config.api.cors_origins.contains(&"*".to_string())
    {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        // Profile pictures are served straight from the upload directory
        .nest_service("/uploads", ServeDir::new(&state.config.upload.dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}

/// Body limit for picture uploads: configured cap plus multipart framing
fn picture_body_limit(state: &AppState) -> usize {
    state.config.upload.max_picture_bytes as usize + 64 * 1024
}

/// Body limit for video uploads: configured cap plus multipart framing
fn video_body_limit(state: &AppState) -> usize {
    state.config.upload.max_video_bytes as usize + 64 * 1024
}

/// Body limit for document uploads: the per-file cap times the most files
/// accepted in one request, plus multipart framing
fn document_body_limit(state: &AppState) -> usize {
    state.config.upload.max_document_bytes as usize * crate::routes::profile::MAX_DOCUMENT_FILES
        + 64 * 1024
}
