use sea_orm::*;
use uuid::Uuid;

use crate::models::applications::{self, ApplicationStatus, NewApplication};

/// Insert a new application (always `pending`).
///
/// A second non-withdrawn row for the same `(user_id, opportunity_id)` is
/// rejected by the `idx_applications_user_opportunity_active` partial unique
/// index and surfaces as a unique-constraint `DbErr`.
pub async fn insert_application(
    db: &DatabaseConnection,
    input: NewApplication,
) -> Result<applications::Model, DbErr> {
    let new_application = applications::ActiveModel {
        id: Set(Uuid::new_v4()),
        status: Set(ApplicationStatus::Pending),
        cover_letter: Set(input.cover_letter),
        proposed_budget: Set(input.proposed_budget),
        user_id: Set(input.user_id),
        opportunity_id: Set(input.opportunity_id),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_application.insert(db).await
}

/// Fetch a single application by ID.
pub async fn get_application_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<applications::Model>, DbErr> {
    applications::Entity::find_by_id(id).one(db).await
}

/// Check whether a user already has a non-withdrawn application on an opportunity.
pub async fn active_application_exists(
    db: &DatabaseConnection,
    opportunity_id: Uuid,
    user_id: Uuid,
) -> Result<bool, DbErr> {
    let count = applications::Entity::find()
        .filter(applications::Column::OpportunityId.eq(opportunity_id))
        .filter(applications::Column::UserId.eq(user_id))
        .filter(applications::Column::Status.ne(ApplicationStatus::Withdrawn))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Fetch all applications sent by a user, newest first.
pub async fn get_applications_by_user_id(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<applications::Model>, DbErr> {
    applications::Entity::find()
        .filter(applications::Column::UserId.eq(user_id))
        .order_by_desc(applications::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch all applications on an opportunity, newest first.
pub async fn get_applications_by_opportunity_id(
    db: &DatabaseConnection,
    opportunity_id: Uuid,
) -> Result<Vec<applications::Model>, DbErr> {
    applications::Entity::find()
        .filter(applications::Column::OpportunityId.eq(opportunity_id))
        .order_by_desc(applications::Column::CreatedAt)
        .all(db)
        .await
}

/// Move an application from `from` to `to` in one conditional UPDATE.
///
/// Returns `None` when no row has that id and status any more, so two
/// concurrent transitions out of the same status cannot both land.
pub async fn update_application_status(
    db: &DatabaseConnection,
    id: Uuid,
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<Option<applications::Model>, DbErr> {
    let changes = applications::ActiveModel {
        status: Set(to),
        updated_at: Set(Some(chrono::Utc::now())),
        ..Default::default()
    };

    let result = applications::Entity::update_many()
        .set(changes)
        .filter(applications::Column::Id.eq(id))
        .filter(applications::Column::Status.eq(from))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }

    get_application_by_id(db, id).await
}

/// Delete an application by ID.
pub async fn delete_application(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    applications::Entity::delete_by_id(id).exec(db).await
}
