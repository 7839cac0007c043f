use async_trait::async_trait;
use uuid::Uuid;

use crate::models::applications::{self, ApplicationStatus};

/// Dispatch error for outbound notifications.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Outbound hook fired after applications are created or change status.
///
/// Failures are logged by the caller and never undo the write that
/// triggered them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn application_submitted(
        &self,
        company_id: Uuid,
        application: &applications::Model,
    ) -> Result<(), NotifyError>;

    async fn status_changed(
        &self,
        application: &applications::Model,
        from: ApplicationStatus,
    ) -> Result<(), NotifyError>;
}

/// Writes notifications to the tracing log.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn application_submitted(
        &self,
        company_id: Uuid,
        application: &applications::Model,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            company_id = %company_id,
            application_id = %application.id,
            opportunity_id = %application.opportunity_id,
            "New application received"
        );
        Ok(())
    }

    async fn status_changed(
        &self,
        application: &applications::Model,
        from: ApplicationStatus,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            application_id = %application.id,
            user_id = %application.user_id,
            from = %from,
            to = %application.status,
            "Application status changed"
        );
        Ok(())
    }
}
