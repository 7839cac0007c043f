//! Company-side management of opportunity postings.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::applications::Actor;
use crate::error::ApplicationError;
use crate::models::opportunities::{self, CreateOpportunity, OpportunityFilter, UpdateOpportunity};
use crate::models::users::Role;
use crate::store::{OpportunityStore, StoreError};
use crate::utils::retry::{RetryPolicy, with_retry};

const FETCH_FAILED: &str = "Failed to fetch opportunities";
const SAVE_FAILED: &str = "Failed to save opportunity";

pub struct OpportunityService<S> {
    store: Arc<S>,
    retry: RetryPolicy,
    remote_timeout: Duration,
}

impl<S> Clone for OpportunityService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            retry: self.retry,
            remote_timeout: self.remote_timeout,
        }
    }
}

fn store_failure(err: StoreError, context: &str) -> ApplicationError {
    match err {
        StoreError::NotFound => ApplicationError::OpportunityNotFound,
        other => {
            tracing::warn!(error = %other, "{context}");
            ApplicationError::RemoteFailure(context.to_string())
        }
    }
}

fn check_budget(min: Option<f64>, max: Option<f64>) -> Result<(), ApplicationError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ApplicationError::InvalidInput(
            "budget_min cannot exceed budget_max".to_string(),
        )),
        _ => Ok(()),
    }
}

impl<S> OpportunityService<S>
where
    S: OpportunityStore + 'static,
{
    pub fn new(store: Arc<S>, retry: RetryPolicy, remote_timeout: Duration) -> Self {
        Self {
            store,
            retry,
            remote_timeout,
        }
    }

    /// Run a single, unretried store write under the remote timeout.
    async fn write<T, F>(&self, call: F) -> Result<T, ApplicationError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(result) => result.map_err(|e| store_failure(e, SAVE_FAILED)),
            Err(_) => {
                tracing::warn!(timeout = ?self.remote_timeout, "{SAVE_FAILED} (store call timed out)");
                Err(ApplicationError::RemoteFailure(SAVE_FAILED.to_string()))
            }
        }
    }

    /// Browse postings. Retried with backoff since it is a pure read.
    pub async fn browse(
        &self,
        filter: &OpportunityFilter,
    ) -> Result<Vec<opportunities::Model>, ApplicationError> {
        with_retry(self.retry, || self.store.list_opportunities(filter))
            .await
            .map_err(|e| store_failure(e, FETCH_FAILED))
    }

    pub async fn get(&self, id: Uuid) -> Result<opportunities::Model, ApplicationError> {
        with_retry(self.retry, || self.store.find_opportunity(id))
            .await
            .map_err(|e| store_failure(e, FETCH_FAILED))?
            .ok_or(ApplicationError::OpportunityNotFound)
    }

    pub async fn by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<opportunities::Model>, ApplicationError> {
        with_retry(self.retry, || self.store.opportunities_by_owner(owner_id))
            .await
            .map_err(|e| store_failure(e, FETCH_FAILED))
    }

    /// Post a new opportunity. Only company and admin accounts may post.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateOpportunity,
    ) -> Result<opportunities::Model, ApplicationError> {
        if actor.role == Role::Freelancer {
            return Err(ApplicationError::Forbidden(
                "Only companies can post opportunities".to_string(),
            ));
        }
        check_budget(input.budget_min, input.budget_max)?;

        let created = self.write(self.store.insert_opportunity(input, actor.id)).await?;

        tracing::info!(opportunity_id = %created.id, owner_id = %actor.id, "Opportunity created");
        Ok(created)
    }

    /// Update a posting, including its status. Owner only.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateOpportunity,
    ) -> Result<opportunities::Model, ApplicationError> {
        let existing = self.get(id).await?;
        if existing.created_by_id != actor.id {
            return Err(ApplicationError::Forbidden(
                "You can only update your own opportunities".to_string(),
            ));
        }
        check_budget(
            input.budget_min.unwrap_or(existing.budget_min),
            input.budget_max.unwrap_or(existing.budget_max),
        )?;

        let updated = self.write(self.store.update_opportunity(id, input)).await?;

        if updated.status != existing.status {
            tracing::info!(
                opportunity_id = %id,
                from = ?existing.status,
                to = ?updated.status,
                "Opportunity status changed"
            );
        }
        Ok(updated)
    }

    /// Delete a posting and, through the foreign key, its applications.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ApplicationError> {
        let existing = self.get(id).await?;
        if existing.created_by_id != actor.id && !actor.is_admin() {
            return Err(ApplicationError::Forbidden(
                "You can only delete your own opportunities".to_string(),
            ));
        }

        let deleted = self.write(self.store.delete_opportunity(id)).await?;
        if !deleted {
            return Err(ApplicationError::OpportunityNotFound);
        }

        tracing::info!(opportunity_id = %id, actor_id = %actor.id, "Opportunity deleted");
        Ok(())
    }
}
