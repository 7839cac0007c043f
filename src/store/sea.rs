use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use uuid::Uuid;

use super::{AccountStore, ApplicationStore, OpportunityStore, StoreError};
use crate::db::applications as application_db;
use crate::db::opportunities as opportunity_db;
use crate::db::users as user_db;
use crate::models::applications::{self, ApplicationStatus, NewApplication};
use crate::models::opportunities::{self, CreateOpportunity, OpportunityFilter, UpdateOpportunity};
use crate::models::users;

/// Postgres-backed store delegating to the `db` query functions.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return StoreError::Conflict;
        }
        match err {
            DbErr::RecordNotFound(_) => StoreError::NotFound,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl OpportunityStore for SeaOrmStore {
    async fn find_opportunity(
        &self,
        id: Uuid,
    ) -> Result<Option<opportunities::Model>, StoreError> {
        Ok(opportunity_db::get_opportunity_by_id(&self.db, id).await?)
    }

    async fn list_opportunities(
        &self,
        filter: &OpportunityFilter,
    ) -> Result<Vec<opportunities::Model>, StoreError> {
        Ok(opportunity_db::search_opportunities(&self.db, filter).await?)
    }

    async fn opportunities_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<opportunities::Model>, StoreError> {
        Ok(opportunity_db::get_opportunities_by_owner(&self.db, owner_id).await?)
    }

    async fn insert_opportunity(
        &self,
        input: CreateOpportunity,
        owner_id: Uuid,
    ) -> Result<opportunities::Model, StoreError> {
        Ok(opportunity_db::insert_opportunity(&self.db, input, owner_id).await?)
    }

    async fn update_opportunity(
        &self,
        id: Uuid,
        input: UpdateOpportunity,
    ) -> Result<opportunities::Model, StoreError> {
        Ok(opportunity_db::update_opportunity(&self.db, id, input).await?)
    }

    async fn delete_opportunity(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = opportunity_db::delete_opportunity(&self.db, id).await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl ApplicationStore for SeaOrmStore {
    async fn find_application(
        &self,
        id: Uuid,
    ) -> Result<Option<applications::Model>, StoreError> {
        Ok(application_db::get_application_by_id(&self.db, id).await?)
    }

    async fn active_application_exists(
        &self,
        opportunity_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        Ok(application_db::active_application_exists(&self.db, opportunity_id, user_id).await?)
    }

    async fn insert_application(
        &self,
        input: NewApplication,
    ) -> Result<applications::Model, StoreError> {
        Ok(application_db::insert_application(&self.db, input).await?)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<applications::Model, StoreError> {
        if let Some(updated) =
            application_db::update_application_status(&self.db, id, from, to).await?
        {
            return Ok(updated);
        }

        match application_db::get_application_by_id(&self.db, id).await? {
            Some(current) => Err(StoreError::StatusChanged {
                current: current.status,
            }),
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_application(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = application_db::delete_application(&self.db, id).await?;
        Ok(result.rows_affected > 0)
    }

    async fn applications_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<applications::Model>, StoreError> {
        Ok(application_db::get_applications_by_user_id(&self.db, user_id).await?)
    }

    async fn applications_by_opportunity(
        &self,
        opportunity_id: Uuid,
    ) -> Result<Vec<applications::Model>, StoreError> {
        Ok(application_db::get_applications_by_opportunity_id(&self.db, opportunity_id).await?)
    }
}

#[async_trait]
impl AccountStore for SeaOrmStore {
    async fn find_account(&self, id: Uuid) -> Result<Option<users::Model>, StoreError> {
        Ok(user_db::get_user_by_id(&self.db, id).await?)
    }
}
