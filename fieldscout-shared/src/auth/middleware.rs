/// Authentication middleware for Axum
///
/// Extracts the Bearer token from the Authorization header, validates it,
/// and inserts an [`AuthContext`] into request extensions for handlers to
/// read.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use fieldscout_shared::auth::middleware::{create_jwt_middleware, AuthContext};
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Account: {} ({})", auth.account_id, auth.role.as_str())
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(handler))
///     .layer(middleware::from_fn(create_jwt_middleware("secret")));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::models::account::AccountRole;

/// Authentication context added to request extensions
///
/// Present on every request that passed JWT validation. Carries the
/// identity claims only; verification status and profile completeness are
/// looked up fresh per request by the gates that need them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated account ID
    pub account_id: Uuid,

    /// Role claimed by the token
    pub role: AccountRole,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(account_id: Uuid, role: AccountRole) -> Self {
        Self { account_id, role }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing credentials".to_string(),
            ),
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
        };

        let body = axum::Json(json!({
            "error": error,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// JWT authentication middleware
///
/// Validates the `Authorization: Bearer <token>` header and inserts an
/// [`AuthContext`] on success.
///
/// # Errors
///
/// Returns 401 Unauthorized when the header is missing, the token is
/// malformed, the signature is wrong, or the token has expired.
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let auth_context = AuthContext::from_claims(claims.sub, claims.role);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Creates a JWT authentication middleware closure
///
/// Captures the secret so the middleware can be attached with
/// `middleware::from_fn`.
pub fn create_jwt_middleware(
    secret: impl Into<String>,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>
       + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(jwt_auth_middleware(secret, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims, TokenType};
    use axum::{body::Body, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    const SECRET: &str = "middleware-test-secret-at-least-32-bytes";

    async fn echo_account(Extension(auth): Extension<AuthContext>) -> String {
        auth.account_id.to_string()
    }

    fn protected_app() -> Router {
        Router::new()
            .route("/protected", get(echo_account))
            .layer(middleware::from_fn(create_jwt_middleware(SECRET)))
    }

    fn get_request(auth_header: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/protected");
        if let Some(value) = auth_header {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_context() {
        let account_id = Uuid::new_v4();
        let claims = Claims::new(account_id, AccountRole::Player, TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let response = protected_app()
            .oneshot(get_request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, account_id.to_string().as_bytes());
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let response = protected_app().oneshot(get_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_bearer_header_is_bad_request() {
        let response = protected_app()
            .oneshot(get_request(Some("Basic dXNlcjpwYXNz")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let response = protected_app()
            .oneshot(get_request(Some("Bearer not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_secret_is_unauthorized() {
        let claims = Claims::new(Uuid::new_v4(), AccountRole::Scout, TokenType::Access);
        let token = create_token(&claims, "another-secret-also-32-bytes-long!!").unwrap();

        let response = protected_app()
            .oneshot(get_request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_auth_context_from_claims() {
        let account_id = Uuid::new_v4();
        let context = AuthContext::from_claims(account_id, AccountRole::Scout);

        assert_eq!(context.account_id, account_id);
        assert_eq!(context.role, AccountRole::Scout);
    }

    #[test]
    fn test_auth_error_status_codes() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AuthError::InvalidToken("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
