use sea_orm::*;
use uuid::Uuid;

use crate::models::users::{self, CompleteProfile, CreateUserFromAuth};

/// Create a new user from Supabase Auth JWT claims (called by auth middleware).
pub async fn find_or_create_from_auth(
    db: &DatabaseConnection,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    // Try to find the user first (by Supabase auth UUID).
    if let Some(existing) = users::Entity::find_by_id(input.id).one(db).await? {
        return Ok(existing);
    }

    let new_user = users::ActiveModel {
        id: Set(input.id),
        email: Set(input.email),
        name: Set(input.name),
        role: Set(input.role),
        bio: Set(None),
        headline: Set(None),
        location: Set(None),
        hourly_rate: Set(None),
        availability_status: Set(None),
        skills: Set(Vec::new()),
        profile_completion: Set(Some(0)),
        avatar_url: Set(input.avatar_url),
        auth_provider: Set(input.auth_provider),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_user.insert(db).await
}

/// Fetch a single user by ID.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

/// Fill in profile fields and recompute `profile_completion`.
pub async fn complete_profile(
    db: &DatabaseConnection,
    id: Uuid,
    input: CompleteProfile,
) -> Result<users::Model, DbErr> {
    let mut user = users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

    if let Some(name) = input.name {
        user.name = Some(name);
    }
    if let Some(bio) = input.bio {
        user.bio = Some(bio);
    }
    if let Some(headline) = input.headline {
        user.headline = Some(headline);
    }
    if let Some(location) = input.location {
        user.location = Some(location);
    }
    if let Some(hourly_rate) = input.hourly_rate {
        user.hourly_rate = Some(hourly_rate);
    }
    if let Some(availability) = input.availability_status {
        user.availability_status = Some(availability);
    }
    if let Some(skills) = input.skills {
        user.skills = skills;
    }
    if let Some(avatar_url) = input.avatar_url {
        user.avatar_url = Some(avatar_url);
    }
    let completion = CompleteProfile::completion_of(&user);

    let mut active: users::ActiveModel = user.clone().into();
    active.name = Set(user.name);
    active.bio = Set(user.bio);
    active.headline = Set(user.headline);
    active.location = Set(user.location);
    active.hourly_rate = Set(user.hourly_rate);
    active.availability_status = Set(user.availability_status);
    active.skills = Set(user.skills);
    active.avatar_url = Set(user.avatar_url);
    active.profile_completion = Set(Some(completion));
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}
