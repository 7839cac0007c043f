use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use uuid::Uuid;

use crate::applications::profile::ProfileField;
use crate::models::applications::ApplicationStatus;
use crate::store::StoreError;

/// Closed set of outcomes the application pipeline can fail with.
///
/// `Display` is the user-facing message; internals of remote failures are
/// logged where they are caught and never rendered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApplicationError {
    #[error("Only freelancers can apply to opportunities")]
    NotAuthorizedRole,

    #[error("Opportunity not found")]
    OpportunityNotFound,

    #[error("This opportunity is no longer accepting applications")]
    OpportunityNotActive,

    #[error("You have already applied to this opportunity")]
    AlreadyApplied,

    #[error("Please complete your profile before applying")]
    ProfileIncomplete { missing: Vec<ProfileField> },

    #[error("Application {0} not found")]
    ApplicationNotFound(Uuid),

    #[error("Cannot move an application from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    RemoteFailure(String),
}

impl ApplicationError {
    pub fn requires_profile_completion(&self) -> bool {
        matches!(self, ApplicationError::ProfileIncomplete { .. })
    }

    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            ApplicationError::NotAuthorizedRole => "not_authorized_role",
            ApplicationError::OpportunityNotFound => "opportunity_not_found",
            ApplicationError::OpportunityNotActive => "opportunity_not_active",
            ApplicationError::AlreadyApplied => "already_applied",
            ApplicationError::ProfileIncomplete { .. } => "profile_incomplete",
            ApplicationError::ApplicationNotFound(_) => "application_not_found",
            ApplicationError::InvalidTransition { .. } => "invalid_transition",
            ApplicationError::Forbidden(_) => "forbidden",
            ApplicationError::InvalidInput(_) => "invalid_input",
            ApplicationError::RemoteFailure(_) => "remote_failure",
        }
    }

    /// Map a storage error to the pipeline taxonomy, with `context` as the
    /// user-facing message for anything that is not a known conflict.
    pub(crate) fn from_store(err: StoreError, context: &str) -> Self {
        match err {
            StoreError::Conflict => ApplicationError::AlreadyApplied,
            other => {
                tracing::warn!(error = %other, "{context}");
                ApplicationError::RemoteFailure(context.to_string())
            }
        }
    }
}

impl ResponseError for ApplicationError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApplicationError::NotAuthorizedRole | ApplicationError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            ApplicationError::OpportunityNotFound | ApplicationError::ApplicationNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApplicationError::OpportunityNotActive
            | ApplicationError::AlreadyApplied
            | ApplicationError::InvalidTransition { .. } => StatusCode::CONFLICT,
            ApplicationError::ProfileIncomplete { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApplicationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApplicationError::RemoteFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        }))
    }
}
