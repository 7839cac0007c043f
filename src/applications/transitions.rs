use uuid::Uuid;

use super::notify::Notifier;
use super::service::{Actor, ApplicationService};
use crate::error::ApplicationError;
use crate::models::applications::{self, ApplicationStatus};
use crate::models::opportunities;
use crate::store::{MarketplaceStore, StoreError};

const UPDATE_FAILED: &str = "Failed to update application status";
const FETCH_FAILED: &str = "Failed to fetch applications";
const DELETE_FAILED: &str = "Failed to delete application";

/// Map a failed conditional status write. A uniqueness conflict is not an
/// "already applied" here; it is a storage failure like any other.
fn status_write_failure(
    err: StoreError,
    application_id: Uuid,
    from: ApplicationStatus,
    next: ApplicationStatus,
) -> ApplicationError {
    match err {
        StoreError::NotFound => ApplicationError::ApplicationNotFound(application_id),
        // Another request moved the row first; judge against where it is now.
        StoreError::StatusChanged { current } => {
            tracing::info!(
                application_id = %application_id,
                expected = %from,
                current = %current,
                "Application status changed concurrently"
            );
            ApplicationError::InvalidTransition {
                from: current,
                to: next,
            }
        }
        err @ (StoreError::Conflict | StoreError::Unavailable(_)) => {
            tracing::warn!(application_id = %application_id, error = %err, "{UPDATE_FAILED}");
            ApplicationError::RemoteFailure(UPDATE_FAILED.to_string())
        }
    }
}

impl<S, N> ApplicationService<S, N>
where
    S: MarketplaceStore + 'static,
    N: Notifier + 'static,
{
    async fn load_application(
        &self,
        application_id: Uuid,
        context: &str,
    ) -> Result<applications::Model, ApplicationError> {
        self.remote(self.store.find_application(application_id), context)
            .await?
            .ok_or(ApplicationError::ApplicationNotFound(application_id))
    }

    async fn load_opportunity(
        &self,
        opportunity_id: Uuid,
        context: &str,
    ) -> Result<opportunities::Model, ApplicationError> {
        self.remote(self.store.find_opportunity(opportunity_id), context)
            .await?
            .ok_or(ApplicationError::OpportunityNotFound)
    }

    /// Move an application to `next`.
    ///
    /// Only the applicant may withdraw. Review decisions belong to the
    /// company that owns the opportunity (or an admin). The transition
    /// itself must be allowed by [`ApplicationStatus::can_transition_to`].
    pub async fn update_status(
        &self,
        actor: &Actor,
        application_id: Uuid,
        next: ApplicationStatus,
    ) -> Result<applications::Model, ApplicationError> {
        let application = self.load_application(application_id, UPDATE_FAILED).await?;

        if next == ApplicationStatus::Withdrawn {
            if actor.id != application.user_id {
                return Err(ApplicationError::Forbidden(
                    "Only the applicant can withdraw an application".to_string(),
                ));
            }
        } else if !actor.is_admin() {
            let opportunity = self
                .load_opportunity(application.opportunity_id, UPDATE_FAILED)
                .await?;
            if opportunity.created_by_id != actor.id {
                return Err(ApplicationError::Forbidden(
                    "Only the company that posted this opportunity can review applications"
                        .to_string(),
                ));
            }
        }

        let from = application.status;
        if !from.can_transition_to(next) {
            return Err(ApplicationError::InvalidTransition { from, to: next });
        }

        let updated = match tokio::time::timeout(
            self.remote_timeout,
            self.store
                .update_application_status(application_id, from, next),
        )
        .await
        {
            Ok(Ok(updated)) => updated,
            Ok(Err(err)) => return Err(status_write_failure(err, application_id, from, next)),
            Err(_) => {
                tracing::warn!(application_id = %application_id, "{UPDATE_FAILED} (timed out)");
                return Err(ApplicationError::RemoteFailure(UPDATE_FAILED.to_string()));
            }
        };

        tracing::info!(
            application_id = %application_id,
            actor_id = %actor.id,
            from = %from,
            to = %next,
            "Application status updated"
        );

        if let Err(e) = self.notifier.status_changed(&updated, from).await {
            tracing::warn!(application_id = %application_id, "Failed to send status notification: {e}");
        }

        Ok(updated)
    }

    /// Applicant-side shortcut for moving to `withdrawn`.
    pub async fn withdraw(
        &self,
        actor: &Actor,
        application_id: Uuid,
    ) -> Result<applications::Model, ApplicationError> {
        self.update_status(actor, application_id, ApplicationStatus::Withdrawn)
            .await
    }

    /// Administrative hard delete.
    pub async fn delete(&self, actor: &Actor, application_id: Uuid) -> Result<(), ApplicationError> {
        if !actor.is_admin() {
            return Err(ApplicationError::Forbidden(
                "Only administrators can delete applications".to_string(),
            ));
        }

        let deleted = self
            .remote(self.store.delete_application(application_id), DELETE_FAILED)
            .await?;
        if !deleted {
            return Err(ApplicationError::ApplicationNotFound(application_id));
        }

        tracing::info!(application_id = %application_id, actor_id = %actor.id, "Application deleted");
        Ok(())
    }

    /// A single application, visible to the applicant, the opportunity owner
    /// and admins.
    pub async fn get_application(
        &self,
        actor: &Actor,
        application_id: Uuid,
    ) -> Result<applications::Model, ApplicationError> {
        let application = self.load_application(application_id, FETCH_FAILED).await?;
        if application.user_id == actor.id || actor.is_admin() {
            return Ok(application);
        }

        let opportunity = self
            .load_opportunity(application.opportunity_id, FETCH_FAILED)
            .await?;
        if opportunity.created_by_id == actor.id {
            Ok(application)
        } else {
            Err(ApplicationError::Forbidden(
                "You can only view applications you are involved in".to_string(),
            ))
        }
    }

    /// Applications the actor has sent, newest first.
    pub async fn applications_for_freelancer(
        &self,
        actor: &Actor,
    ) -> Result<Vec<applications::Model>, ApplicationError> {
        self.remote(self.store.applications_by_user(actor.id), FETCH_FAILED)
            .await
    }

    /// Applications received on one opportunity; owner or admin only.
    pub async fn applications_for_opportunity(
        &self,
        actor: &Actor,
        opportunity_id: Uuid,
    ) -> Result<Vec<applications::Model>, ApplicationError> {
        let opportunity = self.load_opportunity(opportunity_id, FETCH_FAILED).await?;
        if opportunity.created_by_id != actor.id && !actor.is_admin() {
            return Err(ApplicationError::Forbidden(
                "Only the opportunity owner can view its applications".to_string(),
            ));
        }

        self.remote(
            self.store.applications_by_opportunity(opportunity_id),
            FETCH_FAILED,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_status_write_is_not_already_applied() {
        let id = Uuid::new_v4();
        let err = status_write_failure(
            StoreError::Conflict,
            id,
            ApplicationStatus::Withdrawn,
            ApplicationStatus::Pending,
        );
        assert_eq!(err, ApplicationError::RemoteFailure(UPDATE_FAILED.to_string()));
    }

    #[test]
    fn stale_write_is_judged_against_the_current_status() {
        let id = Uuid::new_v4();
        let err = status_write_failure(
            StoreError::StatusChanged {
                current: ApplicationStatus::Rejected,
            },
            id,
            ApplicationStatus::Pending,
            ApplicationStatus::Accepted,
        );
        assert_eq!(
            err,
            ApplicationError::InvalidTransition {
                from: ApplicationStatus::Rejected,
                to: ApplicationStatus::Accepted,
            }
        );
        assert_eq!(
            status_write_failure(
                StoreError::NotFound,
                id,
                ApplicationStatus::Pending,
                ApplicationStatus::Accepted
            ),
            ApplicationError::ApplicationNotFound(id)
        );
    }
}
