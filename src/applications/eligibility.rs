use serde::Serialize;
use uuid::Uuid;

use super::notify::Notifier;
use super::profile::ProfileField;
use super::service::ApplicationService;
use crate::error::ApplicationError;
use crate::models::opportunities::OpportunityStatus;
use crate::models::users::Role;
use crate::store::MarketplaceStore;

const VALIDATION_FAILED: &str = "Validation failed. Please try again.";

/// Outcome of an eligibility check, shaped for API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub can_apply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_profile_completion: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<ProfileField>,
    #[serde(skip)]
    pub reason: Option<ApplicationError>,
}

impl EligibilityResult {
    pub fn eligible() -> Self {
        Self {
            can_apply: true,
            error: None,
            code: None,
            requires_profile_completion: None,
            missing_fields: Vec::new(),
            reason: None,
        }
    }

    pub fn rejected(reason: ApplicationError) -> Self {
        let (requires_profile_completion, missing_fields) = match &reason {
            ApplicationError::ProfileIncomplete { missing } => (Some(true), missing.clone()),
            _ => (None, Vec::new()),
        };

        Self {
            can_apply: false,
            error: Some(reason.to_string()),
            code: Some(reason.code()),
            requires_profile_completion,
            missing_fields,
            reason: Some(reason),
        }
    }
}

impl From<Result<(), ApplicationError>> for EligibilityResult {
    fn from(result: Result<(), ApplicationError>) -> Self {
        match result {
            Ok(()) => Self::eligible(),
            Err(reason) => Self::rejected(reason),
        }
    }
}

impl<S, N> ApplicationService<S, N>
where
    S: MarketplaceStore + 'static,
    N: Notifier + 'static,
{
    /// Decide whether `account_id` may apply to `opportunity_id`.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// role, opportunity existence and status, duplicate application,
    /// profile completeness.
    pub async fn check(
        &self,
        opportunity_id: Uuid,
        account_id: Uuid,
        role: Role,
    ) -> Result<(), ApplicationError> {
        if role != Role::Freelancer {
            return Err(ApplicationError::NotAuthorizedRole);
        }

        let opportunity = self
            .remote(self.store.find_opportunity(opportunity_id), VALIDATION_FAILED)
            .await?
            .ok_or(ApplicationError::OpportunityNotFound)?;

        if opportunity.status != OpportunityStatus::Active {
            return Err(ApplicationError::OpportunityNotActive);
        }

        let already_applied = self
            .remote(
                self.store.active_application_exists(opportunity_id, account_id),
                VALIDATION_FAILED,
            )
            .await?;
        if already_applied {
            return Err(ApplicationError::AlreadyApplied);
        }

        let account = self
            .remote(self.store.find_account(account_id), VALIDATION_FAILED)
            .await?;
        let missing = match account {
            Some(account) => self.policy.evaluate(&account),
            None => vec![ProfileField::Completion],
        };
        if !missing.is_empty() {
            return Err(ApplicationError::ProfileIncomplete { missing });
        }

        Ok(())
    }

    /// [`check`](Self::check) rendered as a result object; never fails.
    pub async fn can_apply(
        &self,
        opportunity_id: Uuid,
        account_id: Uuid,
        role: Role,
    ) -> EligibilityResult {
        let result = self.check(opportunity_id, account_id, role).await;
        if let Err(reason) = &result {
            tracing::debug!(
                opportunity_id = %opportunity_id,
                account_id = %account_id,
                reason = reason.code(),
                "Application not allowed"
            );
        }
        result.into()
    }
}
