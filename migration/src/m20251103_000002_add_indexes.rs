use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Opportunities {
    Table,
    CreatedById,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Applications {
    Table,
    OpportunityId,
    UserId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Postings by owner (company dashboard)
        manager
            .create_index(
                Index::create()
                    .name("idx_opportunities_created_by_id")
                    .table(Opportunities::Table)
                    .col(Opportunities::CreatedById)
                    .to_owned(),
            )
            .await?;

        // Browse: active postings, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_opportunities_status_created_at")
                    .table(Opportunities::Table)
                    .col(Opportunities::Status)
                    .col(Opportunities::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_applications_opportunity_id")
                    .table(Applications::Table)
                    .col(Applications::OpportunityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_applications_user_id")
                    .table(Applications::Table)
                    .col(Applications::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_opportunities_created_by_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_opportunities_status_created_at").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_applications_opportunity_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_applications_user_id").to_owned())
            .await?;

        Ok(())
    }
}
