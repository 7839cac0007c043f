use serde::Serialize;

use super::eligibility::EligibilityResult;
use super::profile::ProfileField;
use super::submitter::SubmitResult;
use crate::models::applications;

/// What the apply widget should show, derived purely from the latest
/// eligibility and submission results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ApplyView {
    /// Eligible and nothing submitted yet: show the cover-letter form.
    Form,
    ProfileRequired {
        message: String,
        missing_fields: Vec<ProfileField>,
    },
    /// Not allowed to apply; show the message with the button disabled.
    Blocked { message: String },
    Submitted { application: applications::Model },
    /// Submission attempted and failed; the form stays open for a retry.
    Failed { message: String },
}

impl ApplyView {
    pub fn from_results(eligibility: &EligibilityResult, submission: Option<&SubmitResult>) -> Self {
        if let Some(submission) = submission {
            if let (true, Some(application)) = (submission.success, &submission.data) {
                return ApplyView::Submitted {
                    application: application.clone(),
                };
            }
            return ApplyView::Failed {
                message: submission
                    .error
                    .clone()
                    .unwrap_or_else(|| "Failed to create application".to_string()),
            };
        }

        if eligibility.can_apply {
            return ApplyView::Form;
        }

        let message = eligibility
            .error
            .clone()
            .unwrap_or_else(|| "You cannot apply to this opportunity".to_string());

        if eligibility.requires_profile_completion == Some(true) {
            ApplyView::ProfileRequired {
                message,
                missing_fields: eligibility.missing_fields.clone(),
            }
        } else {
            ApplyView::Blocked { message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApplicationError;
    use crate::models::applications::ApplicationStatus;
    use uuid::Uuid;

    fn application() -> applications::Model {
        applications::Model {
            id: Uuid::new_v4(),
            status: ApplicationStatus::Pending,
            cover_letter: Some("I'm interested".to_string()),
            proposed_budget: None,
            user_id: Uuid::new_v4(),
            opportunity_id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn eligible_without_submission_shows_form() {
        let view = ApplyView::from_results(&EligibilityResult::eligible(), None);
        assert_eq!(view, ApplyView::Form);
    }

    #[test]
    fn incomplete_profile_asks_for_completion() {
        let eligibility = EligibilityResult::rejected(ApplicationError::ProfileIncomplete {
            missing: vec![ProfileField::Skills],
        });
        match ApplyView::from_results(&eligibility, None) {
            ApplyView::ProfileRequired {
                message,
                missing_fields,
            } => {
                assert_eq!(message, "Please complete your profile before applying");
                assert_eq!(missing_fields, vec![ProfileField::Skills]);
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[test]
    fn other_rejections_block() {
        let eligibility = EligibilityResult::rejected(ApplicationError::AlreadyApplied);
        assert_eq!(
            ApplyView::from_results(&eligibility, None),
            ApplyView::Blocked {
                message: "You have already applied to this opportunity".to_string()
            }
        );
    }

    #[test]
    fn submission_outcome_wins_over_eligibility() {
        let app = application();
        let ok = SubmitResult::from(Ok(app.clone()));
        assert_eq!(
            ApplyView::from_results(&EligibilityResult::eligible(), Some(&ok)),
            ApplyView::Submitted { application: app }
        );

        let failed = SubmitResult::from(Err(ApplicationError::RemoteFailure(
            "Failed to create application. Please try again.".to_string(),
        )));
        assert_eq!(
            ApplyView::from_results(&EligibilityResult::eligible(), Some(&failed)),
            ApplyView::Failed {
                message: "Failed to create application. Please try again.".to_string()
            }
        );
    }
}
