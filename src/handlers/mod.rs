pub mod applications;
pub mod auth;
pub mod opportunities;

use actix_web::web;

use crate::applications::{ApplicationService, TracingNotifier};
use crate::opportunities::OpportunityService;
use crate::store::SeaOrmStore;

/// Application pipeline as wired into the server.
pub type AppApplications = ApplicationService<SeaOrmStore, TracingNotifier>;
pub type AppOpportunities = OpportunityService<SeaOrmStore>;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(
        web::scope("/auth")
            .route("/me", web::get().to(auth::me))
            .route("/complete-profile", web::post().to(auth::complete_profile)),
    );

    // ── Opportunity routes ──
    cfg.service(
        web::scope("/opportunities")
            .route("", web::get().to(opportunities::get_opportunities))
            .route("", web::post().to(opportunities::create_opportunity))
            .route(
                "/company/{company_id}",
                web::get().to(opportunities::get_opportunities_by_company),
            )
            .route("/{id}", web::get().to(opportunities::get_opportunity))
            .route("/{id}", web::put().to(opportunities::update_opportunity))
            .route("/{id}", web::delete().to(opportunities::delete_opportunity))
            .route("/{id}/eligibility", web::get().to(applications::get_eligibility))
            .route(
                "/{id}/applications",
                web::post().to(applications::create_application),
            )
            .route(
                "/{id}/applications",
                web::get().to(applications::get_applications_for_opportunity),
            ),
    );

    // ── Application routes ──
    cfg.service(
        web::scope("/applications")
            .route("", web::get().to(applications::get_my_applications))
            .route("/{id}", web::get().to(applications::get_application))
            .route("/{id}", web::delete().to(applications::delete_application))
            .route("/{id}/status", web::put().to(applications::update_status))
            .route("/{id}/withdraw", web::post().to(applications::withdraw_application)),
    );
}
