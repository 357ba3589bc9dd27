use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, warn};

use taskbox_auth::{AccessDecision, AccessRequest, AssertedIdentity, AuthError, Principal};

use crate::state::AppState;

/// Extract the Bearer token from the Authorization header, if present.
///
/// Returns the raw token without validation; a missing header, an
/// unparsable value or a non-Bearer scheme all read as "no token".
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');
    let scheme = parts.next()?;
    let token = parts.next()?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token)
}

/// Gate middleware for the todo routes.
///
/// Runs the access check on every request before it reaches a handler. A
/// denial answers 401 immediately; an allowance records the admitted
/// subject as the request's asserted identity and forwards.
pub async fn gate_layer(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let resource = format!("{} {}", request.method(), request.uri().path());
    let decision = state
        .gate
        .check_access(AccessRequest {
            token: bearer_token(request.headers()),
            resource: &resource,
        })
        .await;

    match decision {
        AccessDecision::Allow { principal } => {
            request
                .extensions_mut()
                .insert(AssertedIdentity { subject: principal });
            next.run(request).await
        }
        AccessDecision::Deny => {
            // Same body shape as AuthError's boundary response.
            let body = serde_json::json!({ "error": "Unauthorized" });
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        }
    }
}

/// The authenticated caller of a todo route.
///
/// Extraction re-verifies the bearer token and requires the identity the
/// gate layer asserted; either failing rejects with 401. The asserted
/// subject is the owner id for every store call.
pub struct Caller(Principal);

impl Caller {
    pub fn subject(&self) -> &str {
        &self.0.subject
    }
}

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers);
        let asserted = parts.extensions.get::<AssertedIdentity>();

        let principal = state
            .gate
            .confirm_identity(token, asserted)
            .await
            .map_err(|e| {
                warn!(uri = %parts.uri, error = %e, "Caller rejected");
                e
            })?;

        debug!(uri = %parts.uri, subject = %principal.subject, "Caller confirmed");
        Ok(Caller(principal))
    }
}
