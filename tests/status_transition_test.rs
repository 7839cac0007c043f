//! Review workflow: who may move an application, and where to.
mod common;

use common::Harness;
use freelance_hub_backend::applications::Actor;
use freelance_hub_backend::error::ApplicationError;
use freelance_hub_backend::models::applications::{self, ApplicationStatus, CreateApplication};
use freelance_hub_backend::models::opportunities::OpportunityStatus;
use freelance_hub_backend::models::users::{self, Role};
use uuid::Uuid;

struct Scenario {
    h: Harness,
    company: users::Model,
    freelancer: users::Model,
    application: applications::Model,
}

async fn scenario() -> Scenario {
    let h = Harness::new();
    let company = h.account(Role::Company).await;
    let freelancer = h.account(Role::Freelancer).await;
    let posting = h.opportunity(&company, OpportunityStatus::Active).await;
    let application = h
        .service
        .apply(posting.id, freelancer.id, Role::Freelancer, CreateApplication::default())
        .await
        .unwrap();

    Scenario {
        h,
        company,
        freelancer,
        application,
    }
}

#[tokio::test]
async fn company_reviews_then_accepts() {
    let s = scenario().await;
    let owner = Actor::from(&s.company);

    let reviewing = s
        .h
        .service
        .update_status(&owner, s.application.id, ApplicationStatus::Reviewing)
        .await
        .unwrap();
    assert_eq!(reviewing.status, ApplicationStatus::Reviewing);

    let accepted = s
        .h
        .service
        .update_status(&owner, s.application.id, ApplicationStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted.status, ApplicationStatus::Accepted);
    assert!(accepted.updated_at.is_some());

    assert_eq!(
        *s.h.notifier.changed.lock().unwrap(),
        vec![
            (
                s.application.id,
                ApplicationStatus::Pending,
                ApplicationStatus::Reviewing
            ),
            (
                s.application.id,
                ApplicationStatus::Reviewing,
                ApplicationStatus::Accepted
            ),
        ]
    );
}

#[tokio::test]
async fn terminal_states_cannot_be_left() {
    let s = scenario().await;
    let owner = Actor::from(&s.company);

    s.h.service
        .update_status(&owner, s.application.id, ApplicationStatus::Rejected)
        .await
        .unwrap();

    let err = s
        .h
        .service
        .update_status(&owner, s.application.id, ApplicationStatus::Accepted)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApplicationError::InvalidTransition {
            from: ApplicationStatus::Rejected,
            to: ApplicationStatus::Accepted,
        }
    );

    let err = s
        .h
        .service
        .withdraw(&Actor::from(&s.freelancer), s.application.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::InvalidTransition { .. }));
}

#[tokio::test]
async fn moving_back_to_pending_is_rejected() {
    let s = scenario().await;
    let owner = Actor::from(&s.company);

    s.h.service
        .update_status(&owner, s.application.id, ApplicationStatus::Reviewing)
        .await
        .unwrap();
    let err = s
        .h
        .service
        .update_status(&owner, s.application.id, ApplicationStatus::Pending)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApplicationError::InvalidTransition {
            from: ApplicationStatus::Reviewing,
            to: ApplicationStatus::Pending,
        }
    );
}

#[tokio::test]
async fn only_the_owning_company_reviews() {
    let s = scenario().await;
    let other_company = s.h.account(Role::Company).await;

    for actor in [Actor::from(&other_company), Actor::from(&s.freelancer)] {
        let err = s
            .h
            .service
            .update_status(&actor, s.application.id, ApplicationStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Forbidden(_)));
    }

    let admin = s.h.account(Role::Admin).await;
    let updated = s
        .h
        .service
        .update_status(&Actor::from(&admin), s.application.id, ApplicationStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(updated.status, ApplicationStatus::Rejected);
}

#[tokio::test]
async fn only_the_applicant_withdraws() {
    let s = scenario().await;

    let err = s
        .h
        .service
        .withdraw(&Actor::from(&s.company), s.application.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApplicationError::Forbidden("Only the applicant can withdraw an application".to_string())
    );

    let withdrawn = s
        .h
        .service
        .withdraw(&Actor::from(&s.freelancer), s.application.id)
        .await
        .unwrap();
    assert_eq!(withdrawn.status, ApplicationStatus::Withdrawn);
}

#[tokio::test]
async fn applications_are_private_to_the_parties() {
    let s = scenario().await;
    let stranger = s.h.account(Role::Freelancer).await;

    for actor in [Actor::from(&s.freelancer), Actor::from(&s.company)] {
        let seen = s
            .h
            .service
            .get_application(&actor, s.application.id)
            .await
            .unwrap();
        assert_eq!(seen.id, s.application.id);
    }

    let err = s
        .h
        .service
        .get_application(&Actor::from(&stranger), s.application.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Forbidden(_)));

    let err = s
        .h
        .service
        .applications_for_opportunity(&Actor::from(&stranger), s.application.opportunity_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Forbidden(_)));
}

#[tokio::test]
async fn deletion_is_admin_only() {
    let s = scenario().await;

    let err = s
        .h
        .service
        .delete(&Actor::from(&s.company), s.application.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Forbidden(_)));

    let admin = Actor::new(Uuid::new_v4(), Role::Admin);
    s.h.service.delete(&admin, s.application.id).await.unwrap();

    let err = s
        .h
        .service
        .delete(&admin, s.application.id)
        .await
        .unwrap_err();
    assert_eq!(err, ApplicationError::ApplicationNotFound(s.application.id));
}

#[tokio::test]
async fn unknown_application_is_not_found() {
    let s = scenario().await;
    let missing = Uuid::new_v4();

    let err = s
        .h
        .service
        .update_status(&Actor::from(&s.company), missing, ApplicationStatus::Reviewing)
        .await
        .unwrap_err();
    assert_eq!(err, ApplicationError::ApplicationNotFound(missing));
}

#[tokio::test]
async fn racing_decision_and_withdrawal_settle_on_one_terminal_status() {
    let s = scenario().await;
    let owner = Actor::from(&s.company);
    let applicant = Actor::from(&s.freelancer);
    let id = s.application.id;

    // Both requests read `pending` before either writes.
    s.h.store.set_latency(std::time::Duration::from_millis(50));
    let (accept, withdraw) = tokio::join!(
        s.h.service
            .update_status(&owner, id, ApplicationStatus::Accepted),
        async {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            s.h.service.withdraw(&applicant, id).await
        }
    );
    s.h.store.set_latency(std::time::Duration::ZERO);

    let (winner, loser) = match (accept, withdraw) {
        (Ok(won), Err(lost)) | (Err(lost), Ok(won)) => (won, lost),
        (a, w) => panic!("exactly one transition must land, got {a:?} and {w:?}"),
    };
    assert!(winner.status.is_terminal());
    assert!(matches!(
        loser,
        ApplicationError::InvalidTransition { from, .. } if from == winner.status
    ));

    let stored = s
        .h
        .service
        .get_application(&applicant, id)
        .await
        .unwrap();
    assert_eq!(stored.status, winner.status);
    assert_eq!(s.h.notifier.changed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn stale_status_write_reports_current_status() {
    use freelance_hub_backend::store::{ApplicationStore, StoreError};

    let s = scenario().await;
    let id = s.application.id;

    s.h.store
        .update_application_status(id, ApplicationStatus::Pending, ApplicationStatus::Withdrawn)
        .await
        .unwrap();

    let err = s
        .h
        .store
        .update_application_status(id, ApplicationStatus::Pending, ApplicationStatus::Accepted)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::StatusChanged {
            current: ApplicationStatus::Withdrawn
        }
    );

    let err = s
        .h
        .store
        .update_application_status(
            Uuid::new_v4(),
            ApplicationStatus::Pending,
            ApplicationStatus::Accepted,
        )
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound);
}
