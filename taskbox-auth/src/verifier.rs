use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::keyring::KeyRing;

/// Source of decoding keys: either the key ring or a static key for testing.
enum KeySource {
    Ring(Arc<KeyRing>),
    Static(DecodingKey),
}

/// Verifies compact JWTs against the configured issuer and returns their
/// claims.
///
/// Validation covers signature, issuer and expiry. Audience is deliberately
/// not validated: access tokens from the supported issuer carry no `aud`
/// claim.
pub struct TokenVerifier {
    key_source: KeySource,
    config: AuthConfig,
}

impl TokenVerifier {
    /// Create a verifier backed by a key ring.
    pub fn new(ring: Arc<KeyRing>, config: AuthConfig) -> Self {
        Self {
            key_source: KeySource::Ring(ring),
            config,
        }
    }

    /// Create a verifier with a static decoding key (useful for testing).
    pub fn new_with_static_key(key: DecodingKey, config: AuthConfig) -> Self {
        Self {
            key_source: KeySource::Static(key),
            config,
        }
    }

    /// Returns the auth configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify a token and return its subject.
    ///
    /// The token must pass [`verify_claims`](Self::verify_claims) and carry
    /// a non-empty `sub` claim.
    pub async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let claims = self.verify_claims(token).await?;

        match claims.get("sub").and_then(|v| v.as_str()) {
            Some(sub) if !sub.is_empty() => Ok(sub.to_string()),
            _ => Err(AuthError::InvalidToken(
                "Token has no 'sub' claim".into(),
            )),
        }
    }

    /// Verify a token and return the raw claims.
    ///
    /// This performs:
    /// 1. Header decoding to extract `kid` and algorithm
    /// 2. Key retrieval (from the key ring or the static key)
    /// 3. Signature validation
    /// 4. Issuer and expiry validation
    pub async fn verify_claims(&self, token: &str) -> Result<serde_json::Value, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let header = decode_header(token)
            .map_err(|e| AuthError::InvalidToken(format!("Failed to decode header: {e}")))?;

        let algorithm = header.alg;
        debug!(?algorithm, kid = ?header.kid, "Decoded JWT header");

        if self.config.allowed_algorithms.is_empty() {
            return Err(AuthError::ValidationFailed(
                "No allowed JWT algorithms configured".into(),
            ));
        }

        if !self.config.allowed_algorithms.contains(&algorithm) {
            return Err(AuthError::ValidationFailed(format!(
                "Disallowed JWT algorithm: {algorithm:?}"
            )));
        }

        let decoding_key = match &self.key_source {
            KeySource::Static(key) => key.clone(),
            KeySource::Ring(ring) => {
                let kid = header.kid.as_deref().ok_or_else(|| {
                    AuthError::InvalidToken("JWT header missing 'kid' field".into())
                })?;
                ring.ensure_keys().await?;
                ring.decoding_key_for(kid).await?
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.algorithms = self.config.allowed_algorithms.clone();
        validation.set_issuer(&[&self.config.issuer]);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;

        let token_data = decode::<serde_json::Value>(token, &decoding_key, &validation)
            .map_err(|e| {
                let err = match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AuthError::ValidationFailed("Invalid issuer".into())
                    }
                    _ => AuthError::InvalidToken(e.to_string()),
                };
                warn!(error = %err, "JWT validation failed");
                err
            })?;

        let sub = token_data
            .claims
            .get("sub")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");

        debug!(sub = %sub, "JWT validated");
        Ok(token_data.claims)
    }
}
