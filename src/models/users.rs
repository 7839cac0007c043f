use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The `Role` enum maps to a Postgres TEXT column stored as lowercase strings.
///
/// Role strings coming from outside (JWT metadata, query params) are parsed
/// once with [`Role::from_str`], which ignores case.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "freelancer")]
    Freelancer,
    #[sea_orm(string_value = "company")]
    Company,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Freelancer => "freelancer",
            Role::Company => "company",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "freelancer" => Ok(Role::Freelancer),
            "company" => Ok(Role::Company),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "busy")]
    Busy,
    #[sea_orm(string_value = "unavailable")]
    Unavailable,
}

/// SeaORM entity for the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub hourly_rate: Option<f64>,
    pub availability_status: Option<Availability>,
    pub skills: Vec<String>,
    pub profile_completion: Option<i32>,
    pub avatar_url: Option<String>,
    pub auth_provider: String,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::applications::Entity")]
    Applications,
    #[sea_orm(has_many = "super::opportunities::Entity")]
    Opportunities,
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl Related<super::opportunities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Opportunities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs (not stored in DB, used for request bodies) ──

/// Used internally by the auth middleware to create a user from JWT claims.
#[derive(Debug, Clone)]
pub struct CreateUserFromAuth {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub auth_provider: String,
    pub role: Role,
}

/// Used by the `POST /api/auth/complete-profile` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteProfile {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub hourly_rate: Option<f64>,
    pub availability_status: Option<Availability>,
    pub skills: Option<Vec<String>>,
    pub avatar_url: Option<String>,
}

impl CompleteProfile {
    /// Share of the six profile fields that are filled in, as a percentage.
    pub fn completion_of(user: &Model) -> i32 {
        let filled = [
            user.name.as_deref().is_some_and(|v| !v.trim().is_empty()),
            user.bio.as_deref().is_some_and(|v| !v.trim().is_empty()),
            user.headline.as_deref().is_some_and(|v| !v.trim().is_empty()),
            user.location.as_deref().is_some_and(|v| !v.trim().is_empty()),
            user.hourly_rate.is_some(),
            !user.skills.is_empty(),
        ]
        .into_iter()
        .filter(|f| *f)
        .count();

        (filled * 100 / 6) as i32
    }
}

/// A safe user representation for API responses (never leaks internal fields).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub bio: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub hourly_rate: Option<f64>,
    pub availability_status: Option<Availability>,
    pub skills: Vec<String>,
    pub profile_completion: Option<i32>,
    pub avatar_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl From<Model> for UserResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            role: m.role,
            bio: m.bio,
            headline: m.headline,
            location: m.location,
            hourly_rate: m.hourly_rate,
            availability_status: m.availability_status,
            skills: m.skills,
            profile_completion: m.profile_completion,
            avatar_url: m.avatar_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
