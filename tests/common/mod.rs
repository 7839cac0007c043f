#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use freelance_hub_backend::applications::{ApplicationService, Notifier, NotifyError};
use freelance_hub_backend::models::applications::{self, ApplicationStatus};
use freelance_hub_backend::models::opportunities::{
    self, EmploymentType, ExperienceLevel, OpportunityStatus,
};
use freelance_hub_backend::models::users::{self, Role};
use freelance_hub_backend::store::InMemoryStore;

/// Records every notification so tests can assert on them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub submitted: Mutex<Vec<(Uuid, Uuid)>>,
    pub changed: Mutex<Vec<(Uuid, ApplicationStatus, ApplicationStatus)>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn application_submitted(
        &self,
        company_id: Uuid,
        application: &applications::Model,
    ) -> Result<(), NotifyError> {
        self.submitted
            .lock()
            .unwrap()
            .push((company_id, application.id));
        if self.fail {
            return Err(NotifyError::Transport("mailer down".to_string()));
        }
        Ok(())
    }

    async fn status_changed(
        &self,
        application: &applications::Model,
        from: ApplicationStatus,
    ) -> Result<(), NotifyError> {
        self.changed
            .lock()
            .unwrap()
            .push((application.id, from, application.status));
        if self.fail {
            return Err(NotifyError::Transport("mailer down".to_string()));
        }
        Ok(())
    }
}

pub type TestService = ApplicationService<InMemoryStore, RecordingNotifier>;

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub service: TestService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(notifier);
        let service = ApplicationService::new(Arc::clone(&store), Arc::clone(&notifier));
        Self {
            store,
            notifier,
            service,
        }
    }

    /// Insert an account and return it.
    pub async fn account(&self, role: Role) -> users::Model {
        let account = account(role);
        self.store.put_account(account.clone()).await;
        account
    }

    /// Insert an opportunity owned by `owner` with the given status.
    pub async fn opportunity(
        &self,
        owner: &users::Model,
        status: OpportunityStatus,
    ) -> opportunities::Model {
        let opportunity = opportunity(owner.id, status);
        self.store.put_opportunity(opportunity.clone()).await;
        opportunity
    }
}

pub fn account(role: Role) -> users::Model {
    let id = Uuid::new_v4();
    users::Model {
        id,
        email: format!("{id}@example.com"),
        name: Some("Test User".to_string()),
        role,
        bio: None,
        headline: None,
        location: None,
        hourly_rate: None,
        availability_status: None,
        skills: Vec::new(),
        profile_completion: Some(17),
        avatar_url: None,
        auth_provider: "supabase".to_string(),
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn opportunity(owner_id: Uuid, status: OpportunityStatus) -> opportunities::Model {
    opportunities::Model {
        id: Uuid::new_v4(),
        title: "Rust developer".to_string(),
        description: "Maintain an actix-web service".to_string(),
        required_skills: vec!["rust".to_string()],
        budget_min: Some(500.0),
        budget_max: Some(2000.0),
        budget_currency: "USD".to_string(),
        contact_email: "hiring@example.com".to_string(),
        contact_linkedin: None,
        deadline: NaiveDate::from_ymd_opt(2030, 6, 30).unwrap(),
        duration: "2 months".to_string(),
        location: Some("Remote".to_string()),
        employment_type: EmploymentType::Freelance,
        experience_level: ExperienceLevel::Intermediate,
        status,
        created_by_id: owner_id,
        created_at: Utc::now(),
        updated_at: None,
    }
}
