use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application status stored as a lowercase string in the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "reviewing")]
    Reviewing,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Accepted, rejected and withdrawn applications never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Withdrawn)
    }

    /// Whether the application still counts towards the one-per-opportunity rule.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Withdrawn)
    }

    /// Transition table:
    ///
    /// - `pending → reviewing | accepted | rejected | withdrawn`
    /// - `reviewing → accepted | rejected | withdrawn`
    /// - terminal states allow nothing.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;

        matches!(
            (self, next),
            (Pending, Reviewing | Accepted | Rejected | Withdrawn)
                | (Reviewing, Accepted | Rejected | Withdrawn)
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SeaORM entity for the `applications` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub status: ApplicationStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub cover_letter: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub proposed_budget: Option<f64>,
    pub user_id: Uuid,
    pub opportunity_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::opportunities::Entity",
        from = "Column::OpportunityId",
        to = "super::opportunities::Column::Id"
    )]
    Opportunity,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::opportunities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Opportunity.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Row to insert; status is always `pending` on creation.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub opportunity_id: Uuid,
    pub user_id: Uuid,
    pub cover_letter: Option<String>,
    pub proposed_budget: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateApplication {
    pub cover_letter: Option<String>,
    pub proposed_budget: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateApplicationStatus {
    pub status: ApplicationStatus,
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;
    use super::*;

    #[test]
    fn pending_can_move_anywhere_but_back_to_pending() {
        assert!(Pending.can_transition_to(Reviewing));
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Withdrawn));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn reviewing_cannot_return_to_pending() {
        assert!(!Reviewing.can_transition_to(Pending));
        assert!(!Reviewing.can_transition_to(Reviewing));
        assert!(Reviewing.can_transition_to(Accepted));
        assert!(Reviewing.can_transition_to(Withdrawn));
    }

    #[test]
    fn terminal_states_are_immutable() {
        for from in [Accepted, Rejected, Withdrawn] {
            assert!(from.is_terminal());
            for to in [Pending, Reviewing, Accepted, Rejected, Withdrawn] {
                assert!(!from.can_transition_to(to), "{from} -> {to} should be rejected");
            }
        }
    }

    #[test]
    fn only_withdrawn_is_inactive() {
        assert!(Pending.is_active());
        assert!(Accepted.is_active());
        assert!(!Withdrawn.is_active());
    }
}
