//! JWT validation against a locally minted HS256 token.
//!
//! No running server or database is needed.
//!
//! Run with: `cargo test --test auth_test`
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use freelance_hub_backend::auth::jwt::{
    AppMetadata, Claims, TokenVerifier, UserMetadata, validate_token,
};
use freelance_hub_backend::models::users::Role;

/// A fake secret for testing; never the real one.
const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

fn claims_for(sub: &str, email: &str, role: Option<&str>) -> Claims {
    let now = Utc::now().timestamp() as usize;
    Claims {
        sub: sub.to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: Some("https://example.supabase.co/auth/v1".to_string()),
        email: Some(email.to_string()),
        role: Some("authenticated".to_string()),
        user_metadata: Some(UserMetadata {
            full_name: Some("Alice Smith".to_string()),
            avatar_url: Some("https://example.com/avatar.png".to_string()),
            email: Some(email.to_string()),
            email_verified: Some(true),
            role: role.map(str::to_string),
            ..Default::default()
        }),
        app_metadata: Some(AppMetadata {
            provider: Some("email".to_string()),
            role: None,
        }),
    }
}

fn sign(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

#[test]
fn test_valid_token_decodes_correctly() {
    let user_id = Uuid::new_v4();
    let token = sign(
        &claims_for(&user_id.to_string(), "alice@example.com", Some("FREELANCER")),
        TEST_SECRET,
    );

    let claims = validate_token(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.user_email().unwrap(), "alice@example.com");
    assert_eq!(claims.display_name().unwrap(), "Alice Smith");
    assert_eq!(
        claims.avatar_url().unwrap(),
        "https://example.com/avatar.png"
    );
    assert_eq!(claims.marketplace_role(), Role::Freelancer);
}

#[test]
fn test_marketplace_role_is_read_from_metadata() {
    let sub = Uuid::new_v4().to_string();

    let company = claims_for(&sub, "hr@example.com", Some("COMPANY"));
    assert_eq!(company.marketplace_role(), Role::Company);

    // Unknown or missing roles fall back to freelancer.
    assert_eq!(
        claims_for(&sub, "x@example.com", Some("CLIENT")).marketplace_role(),
        Role::Freelancer
    );
    assert_eq!(
        claims_for(&sub, "y@example.com", None).marketplace_role(),
        Role::Freelancer
    );
}

#[test]
fn test_admin_cannot_be_self_assigned() {
    let sub = Uuid::new_v4().to_string();

    for raw in ["admin", "ADMIN", " Admin "] {
        let claims = claims_for(&sub, "mallory@example.com", Some(raw));
        assert_ne!(claims.marketplace_role(), Role::Admin);
        assert_eq!(claims.marketplace_role(), Role::Freelancer);
    }
}

#[test]
fn test_admin_is_granted_through_app_metadata() {
    let sub = Uuid::new_v4().to_string();

    let mut claims = claims_for(&sub, "ops@example.com", Some("company"));
    claims.app_metadata = Some(AppMetadata {
        provider: Some("email".to_string()),
        role: Some("admin".to_string()),
    });
    assert_eq!(claims.marketplace_role(), Role::Admin);

    // Unparseable server roles fall through to the sign-up choice.
    claims.app_metadata = Some(AppMetadata {
        provider: None,
        role: Some("superuser".to_string()),
    });
    assert_eq!(claims.marketplace_role(), Role::Company);
}

#[test]
fn test_signed_token_grants_admin_only_through_app_metadata() {
    let mut claims = claims_for(&Uuid::new_v4().to_string(), "eve@example.com", Some("admin"));
    let token = sign(&claims, TEST_SECRET);
    let decoded = validate_token(&token, TEST_SECRET).unwrap();
    assert_eq!(decoded.marketplace_role(), Role::Freelancer);

    claims.app_metadata = Some(AppMetadata {
        provider: None,
        role: Some("admin".to_string()),
    });
    let token = sign(&claims, TEST_SECRET);
    let decoded = validate_token(&token, TEST_SECRET).unwrap();
    assert_eq!(decoded.marketplace_role(), Role::Admin);
}

#[test]
fn test_expired_token_is_rejected() {
    let mut claims = claims_for(&Uuid::new_v4().to_string(), "expired@example.com", None);
    // Well past the 60s default leeway.
    claims.exp = Utc::now().timestamp() as usize - 300;
    let token = sign(&claims, TEST_SECRET);

    let result = validate_token(&token, TEST_SECRET);
    assert!(result.unwrap_err().contains("ExpiredSignature"));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let token = sign(
        &claims_for(&Uuid::new_v4().to_string(), "bob@example.com", None),
        TEST_SECRET,
    );

    let result = validate_token(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx");
    assert!(result.unwrap_err().contains("InvalidSignature"));
}

#[test]
fn test_garbage_token_is_rejected() {
    assert!(validate_token("not.a.valid.jwt", TEST_SECRET).is_err());
}

#[tokio::test]
async fn test_secret_verifier_matches_validate_token() {
    let user_id = Uuid::new_v4();
    let token = sign(
        &claims_for(&user_id.to_string(), "carol@example.com", Some("company")),
        TEST_SECRET,
    );

    let verifier = TokenVerifier::Secret(TEST_SECRET.to_string());
    let claims = verifier.verify(&token).await.unwrap();
    assert_eq!(claims.user_id().unwrap(), user_id);

    let wrong = TokenVerifier::Secret("another-secret-xxxxxxxxxxxxxxxxxxxxxxxxxxx".to_string());
    assert!(wrong.verify(&token).await.is_err());
}

#[test]
fn test_claims_helpers_with_missing_metadata() {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
        email: Some("bare@example.com".to_string()),
        role: None,
        user_metadata: None,
        app_metadata: None,
    };

    assert_eq!(claims.user_email().unwrap(), "bare@example.com");
    assert!(claims.display_name().is_none());
    assert!(claims.avatar_url().is_none());
    assert_eq!(claims.marketplace_role(), Role::Freelancer);
}
