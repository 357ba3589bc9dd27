use taskbox_auth::AuthConfig;

/// Configuration errors raised while reading the environment.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is not set.
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(name) => {
                write!(f, "Missing required environment variable: {name}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Server configuration, read from the environment.
///
/// A `.env` file is loaded first when present; variables already set in
/// the process environment win.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Region of the user pool the tokens come from.
    pub auth_region: String,
    /// Id of the user pool.
    pub user_pool_id: String,
    /// Name of the backing todo table, used for logging and backend wiring.
    pub table_name: String,
    /// Listen address, `0.0.0.0:3000` by default.
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            auth_region: require("AUTH_REGION")?,
            user_pool_id: require("AUTH_USER_POOL_ID")?,
            table_name: require("TODOS_TABLE")?,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
        })
    }

    /// Token verification config derived from the pool coordinates.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::for_user_pool(&self.auth_region, &self.user_pool_id)
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in ["AUTH_REGION", "AUTH_USER_POOL_ID", "TODOS_TABLE", "BIND_ADDR"] {
            unsafe { std::env::remove_var(name) };
        }
    }

    #[test]
    #[serial]
    fn missing_variable_is_reported_by_name() {
        clear_env();
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("AUTH_REGION")));
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: AUTH_REGION"
        );
    }

    #[test]
    #[serial]
    fn reads_pool_coordinates_and_defaults_the_bind_addr() {
        clear_env();
        unsafe {
            std::env::set_var("AUTH_REGION", "eu-west-1");
            std::env::set_var("AUTH_USER_POOL_ID", "eu-west-1_AbCdEf");
            std::env::set_var("TODOS_TABLE", "todos");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.table_name, "todos");

        let auth = config.auth_config();
        assert_eq!(
            auth.issuer,
            "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_AbCdEf"
        );
        assert!(auth.jwks_url.ends_with("/.well-known/jwks.json"));

        clear_env();
    }
}
