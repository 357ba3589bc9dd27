use std::collections::HashMap;

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Raw JWK structure as returned by the key-discovery endpoint.
/// Extra fields are allowed by serde's default behavior; we only capture
/// what verification needs.
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
struct Jwk {
    /// Key ID
    kid: Option<String>,
    /// Key type (e.g. "RSA")
    kty: String,
    /// Algorithm (e.g. "RS256")
    #[serde(default)]
    alg: Option<String>,
    /// RSA modulus (base64url)
    #[serde(default)]
    n: Option<String>,
    /// RSA exponent (base64url)
    #[serde(default)]
    e: Option<String>,
}

/// JWKS response envelope.
#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

/// One cached signing key, stored as raw components so a `DecodingKey`
/// can be rebuilt on demand.
#[derive(Debug, Clone)]
struct CachedKey {
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

impl CachedKey {
    fn to_decoding_key(&self) -> Result<DecodingKey, AuthError> {
        match self.kty.as_str() {
            "RSA" => {
                let n = self.n.as_deref().ok_or_else(|| {
                    AuthError::KeyFetch("RSA key missing 'n' component".into())
                })?;
                let e = self.e.as_deref().ok_or_else(|| {
                    AuthError::KeyFetch("RSA key missing 'e' component".into())
                })?;
                DecodingKey::from_rsa_components(n, e).map_err(|err| {
                    AuthError::KeyFetch(format!("Failed to construct RSA decoding key: {err}"))
                })
            }
            other => Err(AuthError::KeyFetch(format!(
                "Unsupported key type: {other}"
            ))),
        }
    }
}

/// Key ring holding the issuer's public signing keys, indexed by `kid`.
///
/// The ring starts empty and populates itself on the first
/// [`ensure_keys`](KeyRing::ensure_keys) call; once populated it never
/// touches the network again, so any sequence of verifications performs at
/// most one successful fetch.
///
/// There is no TTL. Rotation is handled by the explicit
/// [`refresh`](KeyRing::refresh) hook, which replaces the cached set
/// wholesale.
pub struct KeyRing {
    keys: RwLock<HashMap<String, CachedKey>>,
    config: AuthConfig,
    client: reqwest::Client,
    fetch_lock: Mutex<()>,
}

impl KeyRing {
    /// Create an empty key ring for the configured issuer.
    ///
    /// No network call happens here; the first verification triggers the
    /// fetch.
    pub fn new(config: AuthConfig) -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            config,
            client: reqwest::Client::new(),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Populate the ring from the key-discovery endpoint if it is empty.
    ///
    /// A no-op when the ring already holds keys. Concurrent callers are
    /// serialized behind a fetch lock so only one of them performs the
    /// network round trip.
    pub async fn ensure_keys(&self) -> Result<(), AuthError> {
        if !self.keys.read().await.is_empty() {
            return Ok(());
        }

        let _guard = self.fetch_lock.lock().await;

        // Another caller may have populated the ring while we waited.
        if !self.keys.read().await.is_empty() {
            return Ok(());
        }

        self.fetch_and_store().await
    }

    /// Force a re-fetch of the key set, replacing the cache wholesale.
    ///
    /// The verify path never calls this; it exists so key rotation can be
    /// driven by an operator or a future expiry policy.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let _guard = self.fetch_lock.lock().await;
        self.fetch_and_store().await
    }

    /// Look up the decoding key for the given `kid`.
    ///
    /// Fails with `UnknownKeyId` when the ring holds no such key. No
    /// re-fetch is attempted on a miss.
    pub async fn decoding_key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let keys = self.keys.read().await;
        keys.get(kid)
            .ok_or_else(|| AuthError::UnknownKeyId(kid.to_string()))?
            .to_decoding_key()
    }

    /// Whether the ring has been populated.
    pub async fn is_primed(&self) -> bool {
        !self.keys.read().await.is_empty()
    }

    async fn fetch_and_store(&self) -> Result<(), AuthError> {
        let response = self
            .client
            .get(&self.config.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        let document: JwksDocument = response
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(format!("Failed to parse JWKS: {e}")))?;

        let keys = collect_keys(document);
        if keys.is_empty() {
            warn!(url = %self.config.jwks_url, "JWKS endpoint returned no usable keys");
        } else {
            debug!(count = keys.len(), "Key ring populated");
        }

        *self.keys.write().await = keys;
        Ok(())
    }
}

fn collect_keys(document: JwksDocument) -> HashMap<String, CachedKey> {
    let mut keys = HashMap::new();
    for jwk in document.keys {
        if let Some(kid) = &jwk.kid {
            keys.insert(
                kid.clone(),
                CachedKey {
                    kty: jwk.kty.clone(),
                    n: jwk.n.clone(),
                    e: jwk.e.clone(),
                },
            );
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::{collect_keys, CachedKey, Jwk, JwksDocument};
    use crate::error::AuthError;

    fn rsa_jwk(kid: Option<&str>) -> Jwk {
        Jwk {
            kid: kid.map(String::from),
            kty: "RSA".into(),
            alg: Some("RS256".into()),
            n: Some("AQAB".into()),
            e: Some("AQAB".into()),
        }
    }

    #[test]
    fn collect_skips_keys_without_kid() {
        let document = JwksDocument {
            keys: vec![rsa_jwk(Some("key-1")), rsa_jwk(None)],
        };
        let keys = collect_keys(document);
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("key-1"));
    }

    #[test]
    fn cached_key_rejects_unsupported_kty() {
        let cached = CachedKey {
            kty: "EC".into(),
            n: None,
            e: None,
        };
        let err = cached.to_decoding_key().unwrap_err();
        assert!(matches!(err, AuthError::KeyFetch(_)));
    }

    #[test]
    fn cached_key_requires_components() {
        let cached = CachedKey {
            kty: "RSA".into(),
            n: None,
            e: Some("AQAB".into()),
        };
        let err = cached.to_decoding_key().unwrap_err();
        assert!(matches!(err, AuthError::KeyFetch(_)));
    }
}
