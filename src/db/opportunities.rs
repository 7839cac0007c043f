use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::opportunities::{
    self, CreateOpportunity, OpportunityFilter, OpportunityStatus, UpdateOpportunity,
};

/// Insert a new opportunity owned by `owner_id`. New postings start `active`.
pub async fn insert_opportunity(
    db: &DatabaseConnection,
    input: CreateOpportunity,
    owner_id: Uuid,
) -> Result<opportunities::Model, DbErr> {
    let new_opportunity = opportunities::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        description: Set(input.description),
        required_skills: Set(input.required_skills),
        budget_min: Set(input.budget_min),
        budget_max: Set(input.budget_max),
        budget_currency: Set(input.budget_currency.unwrap_or_else(|| "USD".to_string())),
        contact_email: Set(input.contact_email),
        contact_linkedin: Set(input.contact_linkedin),
        deadline: Set(input.deadline),
        duration: Set(input.duration),
        location: Set(input.location),
        employment_type: Set(input.employment_type),
        experience_level: Set(input.experience_level),
        status: Set(OpportunityStatus::Active),
        created_by_id: Set(owner_id),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_opportunity.insert(db).await
}

/// Fetch a single opportunity by ID.
pub async fn get_opportunity_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<opportunities::Model>, DbErr> {
    opportunities::Entity::find_by_id(id).one(db).await
}

/// `%needle%` for ILIKE, with LIKE wildcards in the needle escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Browse opportunities, newest first, one page at a time.
///
/// Same semantics as [`OpportunityFilter::matches`], evaluated in SQL.
pub async fn search_opportunities(
    db: &DatabaseConnection,
    filter: &OpportunityFilter,
) -> Result<Vec<opportunities::Model>, DbErr> {
    let mut query = opportunities::Entity::find();

    if !filter.include_inactive {
        query = query.filter(opportunities::Column::Status.eq(OpportunityStatus::Active));
    }
    if !filter.employment_types.is_empty() {
        query = query.filter(
            opportunities::Column::EmploymentType.is_in(filter.employment_types.clone()),
        );
    }
    if !filter.experience_levels.is_empty() {
        query = query.filter(
            opportunities::Column::ExperienceLevel.is_in(filter.experience_levels.clone()),
        );
    }
    if let Some(search) = filter.search_text() {
        let pattern = like_pattern(search);
        query = query.filter(Expr::cust_with_values(
            "(title ILIKE $1 OR description ILIKE $2)",
            [pattern.clone(), pattern],
        ));
    }
    if !filter.skills.is_empty() {
        let wanted: Vec<String> = filter.skills.iter().map(|s| s.to_lowercase()).collect();
        query = query.filter(Expr::cust_with_values(
            "EXISTS (SELECT 1 FROM unnest(required_skills) AS skill WHERE lower(skill) = ANY($1))",
            [wanted],
        ));
    }
    if let Some(location) = filter.location_text() {
        query = query.filter(Expr::cust_with_values(
            "location ILIKE $1",
            [like_pattern(location)],
        ));
    }
    // Range overlap; postings without the opposite bound never match.
    if let Some(min) = filter.budget_min {
        query = query.filter(opportunities::Column::BudgetMax.gte(min));
    }
    if let Some(max) = filter.budget_max {
        query = query.filter(opportunities::Column::BudgetMin.lte(max));
    }

    query
        .order_by_desc(opportunities::Column::CreatedAt)
        .offset(filter.offset)
        .limit(filter.page_size())
        .all(db)
        .await
}

/// Fetch all opportunities posted by one account, newest first.
pub async fn get_opportunities_by_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> Result<Vec<opportunities::Model>, DbErr> {
    opportunities::Entity::find()
        .filter(opportunities::Column::CreatedById.eq(owner_id))
        .order_by_desc(opportunities::Column::CreatedAt)
        .all(db)
        .await
}

/// Update an existing opportunity.
pub async fn update_opportunity(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateOpportunity,
) -> Result<opportunities::Model, DbErr> {
    let opportunity = opportunities::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Opportunity not found".to_string()))?;

    let mut active: opportunities::ActiveModel = opportunity.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(skills) = input.required_skills {
        active.required_skills = Set(skills);
    }
    if let Some(min) = input.budget_min {
        active.budget_min = Set(min);
    }
    if let Some(max) = input.budget_max {
        active.budget_max = Set(max);
    }
    if let Some(currency) = input.budget_currency {
        active.budget_currency = Set(currency);
    }
    if let Some(email) = input.contact_email {
        active.contact_email = Set(email);
    }
    if let Some(linkedin) = input.contact_linkedin {
        active.contact_linkedin = Set(linkedin);
    }
    if let Some(deadline) = input.deadline {
        active.deadline = Set(deadline);
    }
    if let Some(duration) = input.duration {
        active.duration = Set(duration);
    }
    if let Some(location) = input.location {
        active.location = Set(location);
    }
    if let Some(employment_type) = input.employment_type {
        active.employment_type = Set(employment_type);
    }
    if let Some(level) = input.experience_level {
        active.experience_level = Set(level);
    }
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Delete an opportunity by ID. Applications cascade.
pub async fn delete_opportunity(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    opportunities::Entity::delete_by_id(id).exec(db).await
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }
}
