use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};

use taskbox_auth::config::AuthConfig;
use taskbox_auth::error::AuthError;
use taskbox_auth::gate::{AccessDecision, AccessRequest, AssertedIdentity, AuthorizationGate};
use taskbox_auth::verifier::TokenVerifier;

const TEST_SECRET: &[u8] = b"taskbox-test-secret-do-not-use-in-production";
const TEST_ISSUER: &str = "https://issuer.test/pool-1";

fn test_gate() -> AuthorizationGate {
    let config = AuthConfig::new("unused", TEST_ISSUER).with_allowed_algorithm(Algorithm::HS256);
    let verifier = TokenVerifier::new_with_static_key(DecodingKey::from_secret(TEST_SECRET), config);
    AuthorizationGate::new(Arc::new(verifier))
}

fn make_token(sub: &str, exp_offset: i64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let claims = serde_json::json!({
        "sub": sub,
        "iss": TEST_ISSUER,
        "exp": now + exp_offset,
    });
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .unwrap()
}

#[tokio::test]
async fn valid_token_is_allowed() {
    let gate = test_gate();
    let token = make_token("user-1", 3600);

    let decision = gate
        .check_access(AccessRequest {
            token: Some(&token),
            resource: "GET /todos",
        })
        .await;

    assert!(decision.is_allow());
    assert_eq!(
        decision,
        AccessDecision::Allow {
            principal: "user-1".into()
        }
    );
}

#[tokio::test]
async fn missing_token_is_denied() {
    let gate = test_gate();

    let decision = gate
        .check_access(AccessRequest {
            token: None,
            resource: "GET /todos",
        })
        .await;

    assert_eq!(decision, AccessDecision::Deny);
    assert!(!decision.is_allow());
}

#[tokio::test]
async fn broken_tokens_are_denied_not_errored() {
    let gate = test_gate();

    for token in ["garbage", "a.b.c", &make_token("user-1", -3600)] {
        let decision = gate
            .check_access(AccessRequest {
                token: Some(token),
                resource: "DELETE /todos/42",
            })
            .await;
        assert_eq!(decision, AccessDecision::Deny, "token {token:?} should be denied");
    }
}

#[test]
fn decision_serializes_for_diagnostics() {
    let allow = AccessDecision::Allow {
        principal: "user-1".into(),
    };
    let json = serde_json::to_value(&allow).unwrap();
    assert_eq!(json["decision"], "allow");
    assert_eq!(json["principal"], "user-1");

    let json = serde_json::to_value(AccessDecision::Deny).unwrap();
    assert_eq!(json["decision"], "deny");
}

#[tokio::test]
async fn confirm_identity_prefers_the_asserted_subject() {
    let gate = test_gate();
    let token = make_token("token-subject", 3600);
    let asserted = AssertedIdentity {
        subject: "asserted-subject".into(),
    };

    let principal = gate
        .confirm_identity(Some(&token), Some(&asserted))
        .await
        .unwrap();

    assert_eq!(principal.subject, "asserted-subject");
    assert_eq!(principal.token_subject, "token-subject");
}

#[tokio::test]
async fn confirm_identity_requires_the_asserted_claim() {
    let gate = test_gate();
    let token = make_token("user-1", 3600);

    let err = gate.confirm_identity(Some(&token), None).await.unwrap_err();
    assert!(matches!(err, AuthError::MissingAssertedIdentity), "got: {err}");
    assert_eq!(err.public_message(), "Unauthorized");
}

#[tokio::test]
async fn confirm_identity_requires_a_token() {
    let gate = test_gate();
    let asserted = AssertedIdentity {
        subject: "user-1".into(),
    };

    let err = gate.confirm_identity(None, Some(&asserted)).await.unwrap_err();
    assert!(matches!(err, AuthError::MissingToken));
}

#[tokio::test]
async fn confirm_identity_reverifies_the_token() {
    let gate = test_gate();
    let asserted = AssertedIdentity {
        subject: "user-1".into(),
    };

    let err = gate
        .confirm_identity(Some(&make_token("user-1", -3600)), Some(&asserted))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));
}
