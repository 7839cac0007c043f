use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::users;
use crate::models::users::{CompleteProfile, UserResponse};

/// GET /api/auth/me: return the currently authenticated user's profile.
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(UserResponse::from(user.0))
}

/// POST /api/auth/complete-profile: fill in the profile fields used by the
/// application gate; `profile_completion` is recomputed on every call.
pub async fn complete_profile(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CompleteProfile>,
) -> impl Responder {
    let body = body.into_inner();
    if body.hourly_rate.is_some_and(|rate| rate < 0.0) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "hourly_rate cannot be negative",
        }));
    }

    match users::complete_profile(db.get_ref(), user.0.id, body).await {
        Ok(updated) => HttpResponse::Ok().json(UserResponse::from(updated)),
        Err(e) => {
            tracing::error!(user_id = %user.0.id, "Failed to update profile: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update profile",
            }))
        }
    }
}
