use actix_web::{HttpResponse, Responder, ResponseError, web};
use uuid::Uuid;

use super::AppOpportunities;
use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{CacheConfig, CacheData, keys};
use crate::models::opportunities::{
    CreateOpportunity, OpportunityFilter, OpportunityQuery, UpdateOpportunity,
};

/// GET /api/opportunities: browse open postings.
///
/// Filters: `search`, `skills` (comma list), `types`, `experience_levels`,
/// `location`, `budget_min`, `budget_max`. Paged with `limit` (default 50,
/// at most 100) and `offset`.
pub async fn get_opportunities(
    _user: AuthenticatedUser,
    service: web::Data<AppOpportunities>,
    cache: web::Data<CacheData>,
    cache_config: web::Data<CacheConfig>,
    query: web::Query<OpportunityQuery>,
) -> impl Responder {
    let filter = match OpportunityFilter::try_from(query.into_inner()) {
        Ok(filter) => filter,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e }));
        }
    };

    let key = keys::opportunity_list(&filter.cache_key());
    match cache
        .get_or_load(&key, cache_config.opportunity_list_ttl, || service.browse(&filter))
        .await
    {
        Ok(opportunities) => HttpResponse::Ok().json(opportunities),
        Err(e) => e.error_response(),
    }
}

/// GET /api/opportunities/{id}
pub async fn get_opportunity(
    _user: AuthenticatedUser,
    service: web::Data<AppOpportunities>,
    cache: web::Data<CacheData>,
    cache_config: web::Data<CacheConfig>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    let key = keys::opportunity(&id.to_string());
    match cache
        .get_or_load(&key, cache_config.opportunity_ttl, || service.get(id))
        .await
    {
        Ok(opportunity) => HttpResponse::Ok().json(opportunity),
        Err(e) => e.error_response(),
    }
}

/// GET /api/opportunities/company/{company_id}: every posting of one
/// company, whatever its status.
pub async fn get_opportunities_by_company(
    _user: AuthenticatedUser,
    service: web::Data<AppOpportunities>,
    cache: web::Data<CacheData>,
    cache_config: web::Data<CacheConfig>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let company_id = path.into_inner();
    let key = keys::company_opportunities(&company_id.to_string());
    match cache
        .get_or_load(&key, cache_config.opportunity_list_ttl, || {
            service.by_owner(company_id)
        })
        .await
    {
        Ok(opportunities) => HttpResponse::Ok().json(opportunities),
        Err(e) => e.error_response(),
    }
}

/// POST /api/opportunities: companies post a new opportunity.
pub async fn create_opportunity(
    user: AuthenticatedUser,
    service: web::Data<AppOpportunities>,
    cache: web::Data<CacheData>,
    body: web::Json<CreateOpportunity>,
) -> impl Responder {
    match service.create(&user.actor(), body.into_inner()).await {
        Ok(opportunity) => {
            cache.invalidate_opportunities(None).await;
            HttpResponse::Created().json(opportunity)
        }
        Err(e) => e.error_response(),
    }
}

/// PUT /api/opportunities/{id}: owner edits a posting or closes it.
pub async fn update_opportunity(
    user: AuthenticatedUser,
    service: web::Data<AppOpportunities>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOpportunity>,
) -> impl Responder {
    let id = path.into_inner();
    match service.update(&user.actor(), id, body.into_inner()).await {
        Ok(updated) => {
            cache.invalidate_opportunities(Some(&id.to_string())).await;
            HttpResponse::Ok().json(updated)
        }
        Err(e) => e.error_response(),
    }
}

/// DELETE /api/opportunities/{id}
pub async fn delete_opportunity(
    user: AuthenticatedUser,
    service: web::Data<AppOpportunities>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    match service.delete(&user.actor(), id).await {
        Ok(()) => {
            cache.invalidate_opportunities(Some(&id.to_string())).await;
            HttpResponse::Ok().json(serde_json::json!({
                "message": format!("Opportunity {id} deleted"),
            }))
        }
        Err(e) => e.error_response(),
    }
}
