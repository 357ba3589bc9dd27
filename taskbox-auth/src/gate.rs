use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::verifier::TokenVerifier;

/// A request to act on a resource with a bearer-style credential.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    /// The bearer token, if the caller presented one.
    pub token: Option<&'a str>,
    /// Description of the target resource, used for logging only.
    pub resource: &'a str,
}

/// The outcome of an access check. There is no error case: anything that
/// goes wrong during verification is a `Deny`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum AccessDecision {
    /// The caller is allowed; `principal` is the token's subject.
    Allow { principal: String },
    /// The caller is not allowed. No reason is exposed.
    Deny,
}

impl AccessDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, AccessDecision::Allow { .. })
    }
}

/// An identity claim asserted by an upstream gate stage, carried alongside
/// the request (as a request extension in the HTTP layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertedIdentity {
    pub subject: String,
}

/// A confirmed caller identity.
///
/// `subject` is the effective identity and always comes from the asserted
/// claim; `token_subject` is what the token itself says, kept so the two
/// can be compared in logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub token_subject: String,
}

/// Perimeter authorization for resource access.
///
/// The gate answers two questions with one verifier:
/// [`check_access`](Self::check_access) decides whether a request may pass
/// at all, and [`confirm_identity`](Self::confirm_identity) establishes who
/// the caller is once it has passed.
pub struct AuthorizationGate {
    verifier: Arc<TokenVerifier>,
}

impl AuthorizationGate {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Decide whether the request may access its resource.
    ///
    /// Never fails: a missing token, an unknown key, a fetch error or any
    /// validation failure all collapse into [`AccessDecision::Deny`]. The
    /// reason is logged, not returned.
    pub async fn check_access(&self, request: AccessRequest<'_>) -> AccessDecision {
        let token = match request.token {
            Some(token) => token,
            None => {
                warn!(resource = %request.resource, "Access denied: no token presented");
                return AccessDecision::Deny;
            }
        };

        match self.verifier.verify(token).await {
            Ok(subject) => {
                debug!(principal = %subject, resource = %request.resource, "Access allowed");
                AccessDecision::Allow { principal: subject }
            }
            Err(err) => {
                warn!(error = %err, resource = %request.resource, "Access denied");
                AccessDecision::Deny
            }
        }
    }

    /// Confirm the caller's identity from the token plus the asserted claim.
    ///
    /// The token is re-verified from scratch, independently of any earlier
    /// [`check_access`](Self::check_access). The asserted claim is required;
    /// its subject becomes the effective identity even when the token's own
    /// subject differs.
    pub async fn confirm_identity(
        &self,
        token: Option<&str>,
        asserted: Option<&AssertedIdentity>,
    ) -> Result<Principal, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let token_subject = self.verifier.verify(token).await?;

        let asserted = asserted.ok_or(AuthError::MissingAssertedIdentity)?;

        Ok(Principal {
            subject: asserted.subject.clone(),
            token_subject,
        })
    }
}
