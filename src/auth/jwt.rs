use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwks::JwksCache;
use crate::models::users::Role;

/// Supabase JWT claims.
///
/// The `sub` field is the user's UUID in `auth.users`. `user_metadata` holds
/// the OAuth profile plus the marketplace role picked at sign-up and is
/// writable by the user. `app_metadata` is only writable with the service key.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The Supabase auth user UUID.
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    pub iat: Option<usize>,
    pub iss: Option<String>,
    pub email: Option<String>,
    /// Supabase database role (e.g. "authenticated"). Not the marketplace role.
    pub role: Option<String>,
    pub user_metadata: Option<UserMetadata>,
    pub app_metadata: Option<AppMetadata>,
}

/// Server-controlled metadata. The only source an admin role is taken from.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppMetadata {
    pub provider: Option<String>,
    pub role: Option<String>,
}

/// Metadata populated at sign-up and by the OAuth provider.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    /// Marketplace role, e.g. "FREELANCER" or "company".
    pub role: Option<String>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }

    /// Best-effort display name from metadata.
    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.full_name.clone().or_else(|| m.name.clone()))
    }

    /// Best-effort avatar URL from metadata.
    pub fn avatar_url(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.avatar_url.clone().or_else(|| m.picture.clone()))
    }

    /// Best-effort email: prefer top-level, fall back to metadata.
    pub fn user_email(&self) -> Option<String> {
        self.email
            .clone()
            .or_else(|| self.user_metadata.as_ref().and_then(|m| m.email.clone()))
    }

    /// Marketplace role for a new account.
    ///
    /// `app_metadata.role` wins when it parses. From `user_metadata` only
    /// `freelancer` and `company` are honoured; anything else, including
    /// `admin`, falls back to freelancer.
    pub fn marketplace_role(&self) -> Role {
        let granted = self
            .app_metadata
            .as_ref()
            .and_then(|m| m.role.as_deref())
            .and_then(|raw| raw.parse::<Role>().ok());
        if let Some(role) = granted {
            return role;
        }

        let raw = self.user_metadata.as_ref().and_then(|m| m.role.as_deref());
        match raw.map(str::parse::<Role>) {
            Some(Ok(role @ (Role::Freelancer | Role::Company))) => role,
            Some(Ok(Role::Admin)) => {
                tracing::warn!(sub = %self.sub, "Ignoring self-assigned admin role");
                Role::Freelancer
            }
            Some(Err(e)) => {
                tracing::debug!("{e}; defaulting to freelancer");
                Role::Freelancer
            }
            None => Role::Freelancer,
        }
    }
}

/// Validate an HS256 JWT signed with the project's shared secret.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|td| td.claims)
        .map_err(|e| format!("Token validation failed: {e}"))
}

/// How incoming bearer tokens are verified.
///
/// Current Supabase projects sign with asymmetric keys published at the
/// JWKS endpoint; legacy projects use a shared HS256 secret.
#[derive(Clone)]
pub enum TokenVerifier {
    Jwks(Arc<JwksCache>),
    Secret(String),
}

impl TokenVerifier {
    pub async fn verify(&self, token: &str) -> Result<Claims, String> {
        match self {
            TokenVerifier::Jwks(cache) => cache.validate_token(token).await,
            TokenVerifier::Secret(secret) => validate_token(token, secret),
        }
    }
}
