use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// At most one non-withdrawn application per (user, opportunity). Withdrawn
/// rows stay out of the index so a freelancer can apply again.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_applications_user_opportunity_active \
                 ON applications (user_id, opportunity_id) \
                 WHERE status <> 'withdrawn'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_applications_user_opportunity_active")
            .await?;

        Ok(())
    }
}
