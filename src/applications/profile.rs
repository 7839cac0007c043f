//! Minimum-completeness gate a freelancer profile must pass before applying.
//!
//! Which fields are required is deployment configuration. The default policy
//! requires nothing, so any account that exists is accepted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::users;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Bio,
    Headline,
    Location,
    HourlyRate,
    Skills,
    /// `profile_completion` is below the configured minimum.
    Completion,
}

impl ProfileField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Bio => "bio",
            ProfileField::Headline => "headline",
            ProfileField::Location => "location",
            ProfileField::HourlyRate => "hourly_rate",
            ProfileField::Skills => "skills",
            ProfileField::Completion => "completion",
        }
    }

    fn is_present(&self, account: &users::Model) -> bool {
        fn filled(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        match self {
            ProfileField::Name => filled(&account.name),
            ProfileField::Bio => filled(&account.bio),
            ProfileField::Headline => filled(&account.headline),
            ProfileField::Location => filled(&account.location),
            ProfileField::HourlyRate => account.hourly_rate.is_some(),
            ProfileField::Skills => account.skills.iter().any(|s| !s.trim().is_empty()),
            ProfileField::Completion => true,
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(ProfileField::Name),
            "bio" => Ok(ProfileField::Bio),
            "headline" => Ok(ProfileField::Headline),
            "location" => Ok(ProfileField::Location),
            "hourly_rate" => Ok(ProfileField::HourlyRate),
            "skills" => Ok(ProfileField::Skills),
            other => Err(format!("Unknown profile field: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePolicy {
    pub required: Vec<ProfileField>,
    /// Minimum `profile_completion` percentage; `0` disables the check.
    pub min_completion: u8,
}

impl ProfilePolicy {
    pub fn new(required: Vec<ProfileField>, min_completion: u8) -> Self {
        Self {
            required,
            min_completion: min_completion.min(100),
        }
    }

    /// Parse a comma-separated field list such as `"name, bio,skills"`.
    pub fn parse_fields(raw: &str) -> Result<Vec<ProfileField>, String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ProfileField::from_str)
            .collect()
    }

    /// Fields the account is missing. Empty means the profile is complete.
    pub fn evaluate(&self, account: &users::Model) -> Vec<ProfileField> {
        let mut missing: Vec<ProfileField> = self
            .required
            .iter()
            .copied()
            .filter(|field| !field.is_present(account))
            .collect();

        if self.min_completion > 0 {
            let completion = account.profile_completion.unwrap_or(0);
            if completion < i32::from(self.min_completion) {
                missing.push(ProfileField::Completion);
            }
        }

        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::Role;
    use uuid::Uuid;

    fn bare_account() -> users::Model {
        users::Model {
            id: Uuid::new_v4(),
            email: "dev@example.com".to_string(),
            name: None,
            role: Role::Freelancer,
            bio: None,
            headline: None,
            location: None,
            hourly_rate: None,
            availability_status: None,
            skills: Vec::new(),
            profile_completion: None,
            avatar_url: None,
            auth_provider: "google".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn default_policy_accepts_any_account() {
        assert!(ProfilePolicy::default().evaluate(&bare_account()).is_empty());
    }

    #[test]
    fn reports_each_missing_field() {
        let policy = ProfilePolicy::new(
            vec![ProfileField::Name, ProfileField::Bio, ProfileField::Skills],
            0,
        );
        let mut account = bare_account();
        account.name = Some("Ada".to_string());
        account.bio = Some("   ".to_string());

        assert_eq!(
            policy.evaluate(&account),
            vec![ProfileField::Bio, ProfileField::Skills]
        );
    }

    #[test]
    fn minimum_completion_is_enforced() {
        let policy = ProfilePolicy::new(Vec::new(), 60);
        let mut account = bare_account();
        account.profile_completion = Some(50);
        assert_eq!(policy.evaluate(&account), vec![ProfileField::Completion]);

        account.profile_completion = Some(60);
        assert!(policy.evaluate(&account).is_empty());
    }

    #[test]
    fn parses_field_lists() {
        assert_eq!(
            ProfilePolicy::parse_fields("name, BIO,,hourly_rate").unwrap(),
            vec![ProfileField::Name, ProfileField::Bio, ProfileField::HourlyRate]
        );
        assert!(ProfilePolicy::parse_fields("name,portfolio").is_err());
    }
}
