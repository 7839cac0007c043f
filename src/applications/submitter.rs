use serde::Serialize;
use uuid::Uuid;

use super::notify::Notifier;
use super::service::ApplicationService;
use crate::error::ApplicationError;
use crate::models::applications::{self, CreateApplication, NewApplication};
use crate::models::users::Role;
use crate::store::MarketplaceStore;

const SUBMIT_FAILED: &str = "Failed to create application. Please try again.";

/// Outcome of a submission, shaped for API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<applications::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip)]
    pub reason: Option<ApplicationError>,
}

impl From<Result<applications::Model, ApplicationError>> for SubmitResult {
    fn from(result: Result<applications::Model, ApplicationError>) -> Self {
        match result {
            Ok(application) => Self {
                success: true,
                data: Some(application),
                error: None,
                code: None,
                reason: None,
            },
            Err(reason) => Self {
                success: false,
                data: None,
                error: Some(reason.to_string()),
                code: Some(reason.code()),
                reason: Some(reason),
            },
        }
    }
}

impl<S, N> ApplicationService<S, N>
where
    S: MarketplaceStore + 'static,
    N: Notifier + 'static,
{
    /// Insert a `pending` application.
    ///
    /// Does not re-run the eligibility checks; callers are expected to have
    /// seen [`check`](Self::check) succeed. The storage layer still rejects a
    /// second active application for the same pair, which is reported as
    /// [`ApplicationError::AlreadyApplied`].
    pub async fn create(
        &self,
        opportunity_id: Uuid,
        account_id: Uuid,
        input: CreateApplication,
    ) -> Result<applications::Model, ApplicationError> {
        let opportunity = self
            .remote(self.store.find_opportunity(opportunity_id), SUBMIT_FAILED)
            .await?
            .ok_or(ApplicationError::OpportunityNotFound)?;

        let cover_letter = input.cover_letter.filter(|text| !text.trim().is_empty());

        let application = self
            .remote(
                self.store.insert_application(NewApplication {
                    opportunity_id,
                    user_id: account_id,
                    cover_letter,
                    proposed_budget: input.proposed_budget,
                }),
                SUBMIT_FAILED,
            )
            .await?;

        tracing::info!(
            application_id = %application.id,
            opportunity_id = %opportunity_id,
            user_id = %account_id,
            "Application submitted"
        );

        if let Err(e) = self
            .notifier
            .application_submitted(opportunity.created_by_id, &application)
            .await
        {
            tracing::warn!(application_id = %application.id, "Failed to notify company: {e}");
        }

        Ok(application)
    }

    /// [`create`](Self::create) rendered as a result object; never fails.
    pub async fn submit(
        &self,
        opportunity_id: Uuid,
        account_id: Uuid,
        input: CreateApplication,
    ) -> SubmitResult {
        self.create(opportunity_id, account_id, input).await.into()
    }

    /// Eligibility check followed by submission.
    pub async fn apply(
        &self,
        opportunity_id: Uuid,
        account_id: Uuid,
        role: Role,
        input: CreateApplication,
    ) -> Result<applications::Model, ApplicationError> {
        self.check(opportunity_id, account_id, role).await?;
        self.create(opportunity_id, account_id, input).await
    }
}
