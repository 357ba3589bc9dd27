pub mod config;
pub mod error;
pub mod gate;
pub mod keyring;
pub mod verifier;

// Re-export primary public types for convenience.
pub use config::AuthConfig;
pub use error::AuthError;
pub use gate::{AccessDecision, AccessRequest, AssertedIdentity, AuthorizationGate, Principal};
pub use keyring::KeyRing;
pub use verifier::TokenVerifier;
