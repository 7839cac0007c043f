use actix_web::FromRequest;
use actix_web::{Error, HttpRequest, dev::Payload, web};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;

use crate::applications::Actor;
use crate::auth::jwt::TokenVerifier;
use crate::db::users::find_or_create_from_auth;
use crate::models::users::{self, CreateUserFromAuth};

/// The caller's account, resolved from a bearer token. First sign-in creates
/// the account with the role carried in the token's metadata.
pub struct AuthenticatedUser(pub users::Model);

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("Missing Authorization header"))?
                .strip_prefix("Bearer ")
                .ok_or_else(|| {
                    actix_web::error::ErrorUnauthorized(
                        "Authorization header must be: Bearer <token>",
                    )
                })?
                .to_string();

            // 2. Verify it with whichever key source is configured.
            let verifier = req.app_data::<web::Data<TokenVerifier>>().ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Token verifier not configured")
            })?;

            let claims = verifier.verify(&token).await.map_err(|e| {
                tracing::debug!("Rejected bearer token: {e}");
                actix_web::error::ErrorUnauthorized(format!("Invalid token: {e}"))
            })?;

            let user_id = claims
                .user_id()
                .map_err(actix_web::error::ErrorUnauthorized)?;

            let email = claims
                .user_email()
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("No email in token claims"))?;

            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| {
                    actix_web::error::ErrorInternalServerError("Database not configured")
                })?;

            // 3. Find or create the account.
            let user = find_or_create_from_auth(
                db.get_ref(),
                CreateUserFromAuth {
                    id: user_id,
                    email,
                    name: claims.display_name(),
                    avatar_url: claims.avatar_url(),
                    auth_provider: "supabase".to_string(),
                    role: claims.marketplace_role(),
                },
            )
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, "Failed to load account: {e}");
                actix_web::error::ErrorInternalServerError("Failed to load account")
            })?;

            Ok(AuthenticatedUser(user))
        })
    }
}
