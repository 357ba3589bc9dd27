use jsonwebtoken::Algorithm;

/// Configuration for token verification and the JWKS key ring.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// URL of the issuer's key-discovery endpoint
    /// (e.g., https://auth.example.com/.well-known/jwks.json)
    pub jwks_url: String,

    /// Expected issuer in the "iss" claim.
    pub issuer: String,

    /// Allowed JWT algorithms. Tokens using other algorithms are rejected.
    /// Default: RS256 only.
    pub allowed_algorithms: Vec<Algorithm>,
}

impl AuthConfig {
    /// Create a new AuthConfig for the given JWKS endpoint and issuer.
    pub fn new(jwks_url: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            issuer: issuer.into(),
            allowed_algorithms: vec![Algorithm::RS256],
        }
    }

    /// Derive the configuration for a Cognito-style user pool.
    ///
    /// The issuer is `https://cognito-idp.{region}.amazonaws.com/{pool_id}`
    /// and the key-discovery endpoint is `{issuer}/.well-known/jwks.json`.
    pub fn for_user_pool(region: &str, pool_id: &str) -> Self {
        let issuer = format!("https://cognito-idp.{region}.amazonaws.com/{pool_id}");
        let jwks_url = format!("{issuer}/.well-known/jwks.json");
        Self::new(jwks_url, issuer)
    }

    /// Set the allowed JWT algorithms. An empty list will cause verification to fail.
    pub fn with_allowed_algorithms(
        mut self,
        algorithms: impl IntoIterator<Item = Algorithm>,
    ) -> Self {
        self.allowed_algorithms = algorithms.into_iter().collect();
        self
    }

    /// Convenience method to allow a single algorithm.
    pub fn with_allowed_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.allowed_algorithms = vec![algorithm];
        self
    }
}

#[cfg(test)]
mod tests {
    use super::AuthConfig;

    #[test]
    fn user_pool_urls() {
        let config = AuthConfig::for_user_pool("eu-west-1", "eu-west-1_AbCdEf");
        assert_eq!(
            config.issuer,
            "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_AbCdEf"
        );
        assert_eq!(
            config.jwks_url,
            "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_AbCdEf/.well-known/jwks.json"
        );
    }
}
