use actix_web::{HttpResponse, Responder, ResponseError, web};
use uuid::Uuid;

use super::AppApplications;
use crate::applications::SubmitResult;
use crate::auth::middleware::AuthenticatedUser;
use crate::models::applications::{CreateApplication, UpdateApplicationStatus};

/// GET /api/opportunities/{id}/eligibility: whether the caller may apply.
///
/// Always 200; the body says why not.
pub async fn get_eligibility(
    user: AuthenticatedUser,
    service: web::Data<AppApplications>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let opportunity_id = path.into_inner();
    let result = service
        .can_apply(opportunity_id, user.0.id, user.0.role)
        .await;
    HttpResponse::Ok().json(result)
}

/// POST /api/opportunities/{id}/applications: apply to an opportunity.
///
/// Runs the eligibility checks, then submits. The response body is a
/// submission result in both the success and the failure case.
pub async fn create_application(
    user: AuthenticatedUser,
    service: web::Data<AppApplications>,
    path: web::Path<Uuid>,
    body: web::Json<CreateApplication>,
) -> impl Responder {
    let opportunity_id = path.into_inner();
    let outcome = service
        .apply(opportunity_id, user.0.id, user.0.role, body.into_inner())
        .await;

    let status = match &outcome {
        Ok(_) => actix_web::http::StatusCode::CREATED,
        Err(e) => e.status_code(),
    };
    HttpResponse::build(status).json(SubmitResult::from(outcome))
}

/// GET /api/opportunities/{id}/applications: applications received on a
/// posting. Owner or admin only.
pub async fn get_applications_for_opportunity(
    user: AuthenticatedUser,
    service: web::Data<AppApplications>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match service
        .applications_for_opportunity(&user.actor(), path.into_inner())
        .await
    {
        Ok(applications) => HttpResponse::Ok().json(applications),
        Err(e) => e.error_response(),
    }
}

/// GET /api/applications: the caller's own applications, newest first.
pub async fn get_my_applications(
    user: AuthenticatedUser,
    service: web::Data<AppApplications>,
) -> impl Responder {
    match service.applications_for_freelancer(&user.actor()).await {
        Ok(applications) => HttpResponse::Ok().json(applications),
        Err(e) => e.error_response(),
    }
}

/// GET /api/applications/{id}
pub async fn get_application(
    user: AuthenticatedUser,
    service: web::Data<AppApplications>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match service.get_application(&user.actor(), path.into_inner()).await {
        Ok(application) => HttpResponse::Ok().json(application),
        Err(e) => e.error_response(),
    }
}

/// PUT /api/applications/{id}/status: the posting company reviews,
/// accepts or rejects an application.
pub async fn update_status(
    user: AuthenticatedUser,
    service: web::Data<AppApplications>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateApplicationStatus>,
) -> impl Responder {
    match service
        .update_status(&user.actor(), path.into_inner(), body.status)
        .await
    {
        Ok(application) => HttpResponse::Ok().json(application),
        Err(e) => e.error_response(),
    }
}

/// POST /api/applications/{id}/withdraw
pub async fn withdraw_application(
    user: AuthenticatedUser,
    service: web::Data<AppApplications>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match service.withdraw(&user.actor(), path.into_inner()).await {
        Ok(application) => HttpResponse::Ok().json(application),
        Err(e) => e.error_response(),
    }
}

/// DELETE /api/applications/{id}: administrative removal.
pub async fn delete_application(
    user: AuthenticatedUser,
    service: web::Data<AppApplications>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    match service.delete(&user.actor(), id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": format!("Application {id} deleted"),
        })),
        Err(e) => e.error_response(),
    }
}
