//! Storage seam for the application pipeline.
//!
//! The pipeline only needs point lookups, filtered listings, insert-returning,
//! conditional update-by-id and delete-by-id. [`SeaOrmStore`] backs these with Postgres;
//! [`InMemoryStore`] keeps everything in process for tests and local runs.

pub mod memory;
pub mod sea;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::applications::{self, ApplicationStatus, NewApplication};
use crate::models::opportunities::{self, CreateOpportunity, OpportunityFilter, UpdateOpportunity};
use crate::models::users;

pub use memory::InMemoryStore;
pub use sea::SeaOrmStore;

/// Error enumeration for storage failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    /// A conditional status update found the row in another status.
    #[error("status already changed to {current}")]
    StatusChanged { current: ApplicationStatus },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait OpportunityStore: Send + Sync {
    async fn find_opportunity(&self, id: Uuid)
    -> Result<Option<opportunities::Model>, StoreError>;

    async fn list_opportunities(
        &self,
        filter: &OpportunityFilter,
    ) -> Result<Vec<opportunities::Model>, StoreError>;

    async fn opportunities_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<opportunities::Model>, StoreError>;

    async fn insert_opportunity(
        &self,
        input: CreateOpportunity,
        owner_id: Uuid,
    ) -> Result<opportunities::Model, StoreError>;

    async fn update_opportunity(
        &self,
        id: Uuid,
        input: UpdateOpportunity,
    ) -> Result<opportunities::Model, StoreError>;

    /// Returns `false` when nothing was deleted.
    async fn delete_opportunity(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn find_application(&self, id: Uuid)
    -> Result<Option<applications::Model>, StoreError>;

    /// Whether a non-withdrawn application exists for the pair.
    async fn active_application_exists(
        &self,
        opportunity_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError>;

    /// Insert a `pending` application. Must fail with [`StoreError::Conflict`]
    /// when a non-withdrawn application already exists for the pair.
    async fn insert_application(
        &self,
        input: NewApplication,
    ) -> Result<applications::Model, StoreError>;

    /// Compare-and-set on the status column: the write only lands while the
    /// row is still in `from`. Otherwise fails with
    /// [`StoreError::StatusChanged`] carrying the current status, or
    /// [`StoreError::NotFound`] when the row is gone.
    async fn update_application_status(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<applications::Model, StoreError>;

    async fn delete_application(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn applications_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<applications::Model>, StoreError>;

    async fn applications_by_opportunity(
        &self,
        opportunity_id: Uuid,
    ) -> Result<Vec<applications::Model>, StoreError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account(&self, id: Uuid) -> Result<Option<users::Model>, StoreError>;
}

/// Everything the application service needs from storage.
pub trait MarketplaceStore: OpportunityStore + ApplicationStore + AccountStore {}

impl<T> MarketplaceStore for T where T: OpportunityStore + ApplicationStore + AccountStore {}
