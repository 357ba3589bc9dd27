use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Authentication and authorization errors.
///
/// The variants record the internal cause for logs and tests; callers never
/// see them. Every variant collapses to the same generic "Unauthorized"
/// answer at the HTTP boundary so a rejected request cannot tell which
/// check failed.
#[derive(Debug)]
pub enum AuthError {
    /// No bearer token was supplied with the request.
    MissingToken,

    /// The token is malformed or its signature does not verify.
    InvalidToken(String),

    /// The token has expired.
    TokenExpired,

    /// The key ID (kid) from the token header is not in the key ring.
    UnknownKeyId(String),

    /// Fetching the issuer's key set failed or returned malformed data.
    KeyFetch(String),

    /// Claim validation failed (issuer mismatch, disallowed algorithm).
    ValidationFailed(String),

    /// The request carried no upstream-asserted identity claim.
    MissingAssertedIdentity,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing bearer token"),
            AuthError::InvalidToken(msg) => write!(f, "Invalid token: {msg}"),
            AuthError::TokenExpired => write!(f, "Token expired"),
            AuthError::UnknownKeyId(kid) => write!(f, "Unknown signing key: {kid}"),
            AuthError::KeyFetch(msg) => write!(f, "Key fetch error: {msg}"),
            AuthError::ValidationFailed(msg) => write!(f, "Token validation failed: {msg}"),
            AuthError::MissingAssertedIdentity => {
                write!(f, "Missing asserted identity claim")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    pub fn public_message(&self) -> &'static str {
        "Unauthorized"
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.public_message() });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
