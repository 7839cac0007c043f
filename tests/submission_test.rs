//! Submitting applications through the in-memory store.
mod common;

use common::{Harness, RecordingNotifier};
use freelance_hub_backend::applications::{Actor, ApplyView, EligibilityResult};
use freelance_hub_backend::error::ApplicationError;
use freelance_hub_backend::models::applications::{ApplicationStatus, CreateApplication};
use freelance_hub_backend::models::opportunities::OpportunityStatus;
use freelance_hub_backend::models::users::Role;
use uuid::Uuid;

fn cover_letter(text: &str) -> CreateApplication {
    CreateApplication {
        cover_letter: Some(text.to_string()),
        proposed_budget: Some(1200.0),
    }
}

#[tokio::test]
async fn submitted_application_is_pending_and_visible_to_the_company() {
    let h = Harness::new();
    let company = h.account(Role::Company).await;
    let freelancer = h.account(Role::Freelancer).await;
    let posting = h.opportunity(&company, OpportunityStatus::Active).await;

    let result = h
        .service
        .submit(posting.id, freelancer.id, cover_letter("I have shipped three actix services."))
        .await;

    assert!(result.success);
    let application = result.data.clone().unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.user_id, freelancer.id);
    assert_eq!(application.opportunity_id, posting.id);
    assert_eq!(application.proposed_budget, Some(1200.0));
    assert_eq!(
        application.cover_letter.as_deref(),
        Some("I have shipped three actix services.")
    );

    let received = h
        .service
        .applications_for_opportunity(&Actor::from(&company), posting.id)
        .await
        .unwrap();
    assert_eq!(received, vec![application.clone()]);

    let mine = h
        .service
        .applications_for_freelancer(&Actor::from(&freelancer))
        .await
        .unwrap();
    assert_eq!(mine, vec![application.clone()]);

    assert_eq!(
        *h.notifier.submitted.lock().unwrap(),
        vec![(company.id, application.id)]
    );

    let eligibility = h
        .service
        .can_apply(posting.id, freelancer.id, Role::Freelancer)
        .await;
    assert_eq!(
        ApplyView::from_results(&eligibility, Some(&result)),
        ApplyView::Submitted { application }
    );
}

#[tokio::test]
async fn blank_cover_letters_are_stored_as_absent() {
    let h = Harness::new();
    let company = h.account(Role::Company).await;
    let freelancer = h.account(Role::Freelancer).await;
    let posting = h.opportunity(&company, OpportunityStatus::Active).await;

    let application = h
        .service
        .create(posting.id, freelancer.id, cover_letter("   \n"))
        .await
        .unwrap();

    assert_eq!(application.cover_letter, None);
}

#[tokio::test]
async fn storage_uniqueness_rejects_duplicates_without_a_precheck() {
    let h = Harness::new();
    let company = h.account(Role::Company).await;
    let freelancer = h.account(Role::Freelancer).await;
    let posting = h.opportunity(&company, OpportunityStatus::Active).await;

    h.service
        .create(posting.id, freelancer.id, CreateApplication::default())
        .await
        .unwrap();
    let second = h
        .service
        .submit(posting.id, freelancer.id, CreateApplication::default())
        .await;

    assert!(!second.success);
    assert_eq!(second.reason, Some(ApplicationError::AlreadyApplied));
    assert_eq!(
        second.error.as_deref(),
        Some("You have already applied to this opportunity")
    );
}

#[tokio::test]
async fn concurrent_submissions_create_exactly_one_application() {
    let h = Harness::new();
    let company = h.account(Role::Company).await;
    let freelancer = h.account(Role::Freelancer).await;
    let posting = h.opportunity(&company, OpportunityStatus::Active).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = h.service.clone();
        let (opportunity_id, user_id) = (posting.id, freelancer.id);
        handles.push(tokio::spawn(async move {
            service
                .apply(opportunity_id, user_id, Role::Freelancer, CreateApplication::default())
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e, ApplicationError::AlreadyApplied),
        }
    }
    assert_eq!(created, 1);

    let received = h
        .service
        .applications_for_opportunity(&Actor::from(&company), posting.id)
        .await
        .unwrap();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn reapplying_after_withdrawal_creates_a_new_application() {
    let h = Harness::new();
    let company = h.account(Role::Company).await;
    let freelancer = h.account(Role::Freelancer).await;
    let posting = h.opportunity(&company, OpportunityStatus::Active).await;
    let actor = Actor::from(&freelancer);

    let first = h
        .service
        .apply(posting.id, freelancer.id, Role::Freelancer, CreateApplication::default())
        .await
        .unwrap();
    h.service.withdraw(&actor, first.id).await.unwrap();

    let second = h
        .service
        .apply(posting.id, freelancer.id, Role::Freelancer, CreateApplication::default())
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    let mine = h.service.applications_for_freelancer(&actor).await.unwrap();
    assert_eq!(mine.len(), 2);
}

#[tokio::test]
async fn notifier_failures_do_not_undo_the_submission() {
    let h = Harness::with_notifier(RecordingNotifier {
        fail: true,
        ..Default::default()
    });
    let company = h.account(Role::Company).await;
    let freelancer = h.account(Role::Freelancer).await;
    let posting = h.opportunity(&company, OpportunityStatus::Active).await;

    let result = h
        .service
        .submit(posting.id, freelancer.id, CreateApplication::default())
        .await;

    assert!(result.success);
    assert_eq!(h.notifier.submitted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn storage_failures_use_the_submission_message() {
    let h = Harness::new();
    let company = h.account(Role::Company).await;
    let freelancer = h.account(Role::Freelancer).await;
    let posting = h.opportunity(&company, OpportunityStatus::Active).await;
    h.store.set_offline(true);

    let result = h
        .service
        .submit(posting.id, freelancer.id, CreateApplication::default())
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Failed to create application. Please try again.")
    );
    assert!(matches!(
        ApplyView::from_results(&EligibilityResult::eligible(), Some(&result)),
        ApplyView::Failed { .. }
    ));
}

#[tokio::test]
async fn apply_stops_at_the_first_failed_check() {
    let h = Harness::new();
    let company = h.account(Role::Company).await;
    let posting = h.opportunity(&company, OpportunityStatus::Active).await;

    let err = h
        .service
        .apply(posting.id, company.id, Role::Company, CreateApplication::default())
        .await
        .unwrap_err();
    assert_eq!(err, ApplicationError::NotAuthorizedRole);

    let err = h
        .service
        .apply(Uuid::new_v4(), company.id, Role::Freelancer, CreateApplication::default())
        .await
        .unwrap_err();
    assert_eq!(err, ApplicationError::OpportunityNotFound);

    // Nothing was written.
    let received = h
        .service
        .applications_for_opportunity(&Actor::from(&company), posting.id)
        .await
        .unwrap();
    assert!(received.is_empty());
}
