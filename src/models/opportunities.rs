use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Posting lifecycle; only `Active` opportunities accept applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "expired")]
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    #[sea_orm(string_value = "full_time")]
    FullTime,
    #[sea_orm(string_value = "part_time")]
    PartTime,
    #[sea_orm(string_value = "contract")]
    Contract,
    #[sea_orm(string_value = "freelance")]
    Freelance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[sea_orm(string_value = "entry")]
    Entry,
    #[sea_orm(string_value = "intermediate")]
    Intermediate,
    #[sea_orm(string_value = "senior")]
    Senior,
    #[sea_orm(string_value = "expert")]
    Expert,
}

/// SeaORM entity for the `opportunities` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "opportunities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub required_skills: Vec<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub budget_min: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub budget_max: Option<f64>,
    pub budget_currency: String,
    pub contact_email: String,
    pub contact_linkedin: Option<String>,
    pub deadline: Date,
    pub duration: String,
    pub location: Option<String>,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub status: OpportunityStatus,
    pub created_by_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::applications::Entity")]
    Applications,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedById",
        to = "super::users::Column::Id"
    )]
    CreatedBy,
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreatedBy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOpportunity {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub budget_currency: Option<String>,
    pub contact_email: String,
    pub contact_linkedin: Option<String>,
    pub deadline: Date,
    pub duration: String,
    pub location: Option<String>,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
}

/// Partial update. For nullable columns an absent field leaves the value
/// alone and an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOpportunity {
    pub title: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub budget_min: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub budget_max: Option<Option<f64>>,
    pub budget_currency: Option<String>,
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub contact_linkedin: Option<Option<String>>,
    pub deadline: Option<Date>,
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub location: Option<Option<String>>,
    pub employment_type: Option<EmploymentType>,
    pub experience_level: Option<ExperienceLevel>,
    pub status: Option<OpportunityStatus>,
}

fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Page size used when a listing does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 50;
/// Upper bound on a single listing page.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Browse/search filters. Every populated field narrows the result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityFilter {
    pub search: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub employment_types: Vec<EmploymentType>,
    #[serde(default)]
    pub experience_levels: Vec<ExperienceLevel>,
    pub location: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    /// Browsing only ever shows open postings; owners list through
    /// `opportunities_by_owner` instead.
    #[serde(skip)]
    pub include_inactive: bool,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

impl OpportunityFilter {
    /// Requested page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn page_size(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Trimmed, non-empty search text.
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Trimmed, non-empty location text.
    pub fn location_text(&self) -> Option<&str> {
        self.location.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether `opportunity` passes this filter.
    ///
    /// Budget filters follow range overlap: `budget_min` keeps postings whose
    /// maximum reaches it, `budget_max` keeps postings whose minimum stays
    /// under it. Postings without the relevant bound are excluded.
    pub fn matches(&self, opportunity: &Model) -> bool {
        if !self.include_inactive && opportunity.status != OpportunityStatus::Active {
            return false;
        }

        if let Some(search) = self.search_text() {
            let needle = search.to_lowercase();
            if !opportunity.title.to_lowercase().contains(&needle)
                && !opportunity.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if !self.skills.is_empty()
            && !self.skills.iter().any(|wanted| {
                opportunity
                    .required_skills
                    .iter()
                    .any(|have| have.eq_ignore_ascii_case(wanted))
            })
        {
            return false;
        }

        if !self.employment_types.is_empty()
            && !self.employment_types.contains(&opportunity.employment_type)
        {
            return false;
        }

        if !self.experience_levels.is_empty()
            && !self.experience_levels.contains(&opportunity.experience_level)
        {
            return false;
        }

        if let Some(location) = self.location_text() {
            let needle = location.to_lowercase();
            match &opportunity.location {
                Some(have) if have.to_lowercase().contains(&needle) => {}
                _ => return false,
            }
        }

        if let Some(min) = self.budget_min {
            match opportunity.budget_max {
                Some(max) if max >= min => {}
                _ => return false,
            }
        }

        if let Some(max) = self.budget_max {
            match opportunity.budget_min {
                Some(min) if min <= max => {}
                _ => return false,
            }
        }

        true
    }

    /// Stable string used to key cached listings.
    pub fn cache_key(&self) -> String {
        let mut skills: Vec<String> = self.skills.iter().map(|s| s.to_lowercase()).collect();
        skills.sort();
        format!(
            "q={}|skills={}|types={:?}|levels={:?}|loc={}|min={:?}|max={:?}|all={}|page={}+{}",
            self.search.as_deref().unwrap_or_default().to_lowercase(),
            skills.join(","),
            self.employment_types,
            self.experience_levels,
            self.location.as_deref().unwrap_or_default().to_lowercase(),
            self.budget_min,
            self.budget_max,
            self.include_inactive,
            self.offset,
            self.page_size(),
        )
    }
}

/// Query-string form of [`OpportunityFilter`]. List values are
/// comma-separated, e.g. `?skills=rust,go&types=contract`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityQuery {
    pub search: Option<String>,
    pub skills: Option<String>,
    pub types: Option<String>,
    pub experience_levels: Option<String>,
    pub location: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse one enum value case-insensitively through its serde name.
fn parse_variant<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, String> {
    let normalized = raw.to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|_| format!("Unknown filter value: {raw}"))
}

impl TryFrom<OpportunityQuery> for OpportunityFilter {
    type Error = String;

    fn try_from(query: OpportunityQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            skills: split_list(query.skills.as_deref()).map(str::to_string).collect(),
            employment_types: split_list(query.types.as_deref())
                .map(parse_variant)
                .collect::<Result<_, _>>()?,
            experience_levels: split_list(query.experience_levels.as_deref())
                .map(parse_variant)
                .collect::<Result<_, _>>()?,
            search: query.search,
            location: query.location,
            budget_min: query.budget_min,
            budget_max: query.budget_max,
            include_inactive: false,
            limit: query.limit,
            offset: query.offset.unwrap_or_default(),
        })
    }
}
