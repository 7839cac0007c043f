use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, ApplicationStore, OpportunityStore, StoreError};
use crate::models::applications::{self, ApplicationStatus, NewApplication};
use crate::models::opportunities::{
    self, CreateOpportunity, OpportunityFilter, OpportunityStatus, UpdateOpportunity,
};
use crate::models::users;

/// In-process store with the same uniqueness rule as the Postgres schema.
///
/// The duplicate check and the insert run under one write lock, so two
/// concurrent submissions for the same pair cannot both succeed. Status
/// updates compare the current status under the same lock.
#[derive(Default)]
pub struct InMemoryStore {
    accounts: RwLock<HashMap<Uuid, users::Model>>,
    opportunities: RwLock<HashMap<Uuid, opportunities::Model>>,
    applications: RwLock<HashMap<Uuid, applications::Model>>,
    offline: AtomicBool,
    latency_ms: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_account(&self, account: users::Model) {
        self.accounts.write().await.insert(account.id, account);
    }

    pub async fn put_opportunity(&self, opportunity: opportunities::Model) {
        self.opportunities
            .write()
            .await
            .insert(opportunity.id, opportunity);
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay every subsequent call, to simulate a slow backend.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn ensure_online(&self) -> Result<(), StoreError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        Ok(())
    }
}

fn newest_first<T>(
    mut rows: Vec<T>,
    created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>,
) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

#[async_trait]
impl OpportunityStore for InMemoryStore {
    async fn find_opportunity(
        &self,
        id: Uuid,
    ) -> Result<Option<opportunities::Model>, StoreError> {
        self.ensure_online().await?;
        Ok(self.opportunities.read().await.get(&id).cloned())
    }

    async fn list_opportunities(
        &self,
        filter: &OpportunityFilter,
    ) -> Result<Vec<opportunities::Model>, StoreError> {
        self.ensure_online().await?;
        let rows = self
            .opportunities
            .read()
            .await
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        Ok(newest_first(rows, |o: &opportunities::Model| o.created_at)
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.page_size() as usize)
            .collect())
    }

    async fn opportunities_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<opportunities::Model>, StoreError> {
        self.ensure_online().await?;
        let rows = self
            .opportunities
            .read()
            .await
            .values()
            .filter(|o| o.created_by_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |o: &opportunities::Model| o.created_at))
    }

    async fn insert_opportunity(
        &self,
        input: CreateOpportunity,
        owner_id: Uuid,
    ) -> Result<opportunities::Model, StoreError> {
        self.ensure_online().await?;
        let opportunity = opportunities::Model {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            required_skills: input.required_skills,
            budget_min: input.budget_min,
            budget_max: input.budget_max,
            budget_currency: input.budget_currency.unwrap_or_else(|| "USD".to_string()),
            contact_email: input.contact_email,
            contact_linkedin: input.contact_linkedin,
            deadline: input.deadline,
            duration: input.duration,
            location: input.location,
            employment_type: input.employment_type,
            experience_level: input.experience_level,
            status: OpportunityStatus::Active,
            created_by_id: owner_id,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };
        self.put_opportunity(opportunity.clone()).await;
        Ok(opportunity)
    }

    async fn update_opportunity(
        &self,
        id: Uuid,
        input: UpdateOpportunity,
    ) -> Result<opportunities::Model, StoreError> {
        self.ensure_online().await?;
        let mut rows = self.opportunities.write().await;
        let opportunity = rows.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(title) = input.title {
            opportunity.title = title;
        }
        if let Some(description) = input.description {
            opportunity.description = description;
        }
        if let Some(skills) = input.required_skills {
            opportunity.required_skills = skills;
        }
        if let Some(min) = input.budget_min {
            opportunity.budget_min = min;
        }
        if let Some(max) = input.budget_max {
            opportunity.budget_max = max;
        }
        if let Some(currency) = input.budget_currency {
            opportunity.budget_currency = currency;
        }
        if let Some(email) = input.contact_email {
            opportunity.contact_email = email;
        }
        if let Some(linkedin) = input.contact_linkedin {
            opportunity.contact_linkedin = linkedin;
        }
        if let Some(deadline) = input.deadline {
            opportunity.deadline = deadline;
        }
        if let Some(duration) = input.duration {
            opportunity.duration = duration;
        }
        if let Some(location) = input.location {
            opportunity.location = location;
        }
        if let Some(employment_type) = input.employment_type {
            opportunity.employment_type = employment_type;
        }
        if let Some(level) = input.experience_level {
            opportunity.experience_level = level;
        }
        if let Some(status) = input.status {
            opportunity.status = status;
        }
        opportunity.updated_at = Some(chrono::Utc::now());

        Ok(opportunity.clone())
    }

    async fn delete_opportunity(&self, id: Uuid) -> Result<bool, StoreError> {
        self.ensure_online().await?;
        let removed = self.opportunities.write().await.remove(&id).is_some();
        if removed {
            // Mirrors the ON DELETE CASCADE foreign key.
            self.applications
                .write()
                .await
                .retain(|_, a| a.opportunity_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl ApplicationStore for InMemoryStore {
    async fn find_application(
        &self,
        id: Uuid,
    ) -> Result<Option<applications::Model>, StoreError> {
        self.ensure_online().await?;
        Ok(self.applications.read().await.get(&id).cloned())
    }

    async fn active_application_exists(
        &self,
        opportunity_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        self.ensure_online().await?;
        Ok(self.applications.read().await.values().any(|a| {
            a.opportunity_id == opportunity_id && a.user_id == user_id && a.status.is_active()
        }))
    }

    async fn insert_application(
        &self,
        input: NewApplication,
    ) -> Result<applications::Model, StoreError> {
        self.ensure_online().await?;
        let mut rows = self.applications.write().await;

        let duplicate = rows.values().any(|a| {
            a.opportunity_id == input.opportunity_id
                && a.user_id == input.user_id
                && a.status.is_active()
        });
        if duplicate {
            return Err(StoreError::Conflict);
        }

        let application = applications::Model {
            id: Uuid::new_v4(),
            status: ApplicationStatus::Pending,
            cover_letter: input.cover_letter,
            proposed_budget: input.proposed_budget,
            user_id: input.user_id,
            opportunity_id: input.opportunity_id,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };
        rows.insert(application.id, application.clone());

        Ok(application)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<applications::Model, StoreError> {
        self.ensure_online().await?;
        let mut rows = self.applications.write().await;
        let application = rows.get_mut(&id).ok_or(StoreError::NotFound)?;
        if application.status != from {
            return Err(StoreError::StatusChanged {
                current: application.status,
            });
        }
        application.status = to;
        application.updated_at = Some(chrono::Utc::now());
        Ok(application.clone())
    }

    async fn delete_application(&self, id: Uuid) -> Result<bool, StoreError> {
        self.ensure_online().await?;
        Ok(self.applications.write().await.remove(&id).is_some())
    }

    async fn applications_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<applications::Model>, StoreError> {
        self.ensure_online().await?;
        let rows = self
            .applications
            .read()
            .await
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |a: &applications::Model| a.created_at))
    }

    async fn applications_by_opportunity(
        &self,
        opportunity_id: Uuid,
    ) -> Result<Vec<applications::Model>, StoreError> {
        self.ensure_online().await?;
        let rows = self
            .applications
            .read()
            .await
            .values()
            .filter(|a| a.opportunity_id == opportunity_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |a: &applications::Model| a.created_at))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_account(&self, id: Uuid) -> Result<Option<users::Model>, StoreError> {
        self.ensure_online().await?;
        Ok(self.accounts.read().await.get(&id).cloned())
    }
}
