use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `opportunities` table and its columns.
#[derive(DeriveIden)]
enum Opportunities {
    Table,
    Id,
    Title,
    Description,
    RequiredSkills,
    BudgetMin,
    BudgetMax,
    BudgetCurrency,
    ContactEmail,
    ContactLinkedin,
    Deadline,
    Duration,
    Location,
    EmploymentType,
    ExperienceLevel,
    Status,
    CreatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Opportunities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Opportunities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Opportunities::Title).string().not_null())
                    .col(ColumnDef::new(Opportunities::Description).text().not_null())
                    .col(
                        ColumnDef::new(Opportunities::RequiredSkills)
                            .array(ColumnType::Text)
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(ColumnDef::new(Opportunities::BudgetMin).double().null())
                    .col(ColumnDef::new(Opportunities::BudgetMax).double().null())
                    .col(
                        ColumnDef::new(Opportunities::BudgetCurrency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Opportunities::ContactEmail).string().not_null())
                    .col(ColumnDef::new(Opportunities::ContactLinkedin).string().null())
                    .col(ColumnDef::new(Opportunities::Deadline).date().not_null())
                    .col(ColumnDef::new(Opportunities::Duration).string().not_null())
                    .col(ColumnDef::new(Opportunities::Location).string().null())
                    .col(
                        ColumnDef::new(Opportunities::EmploymentType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Opportunities::ExperienceLevel)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Opportunities::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Opportunities::CreatedById).uuid().not_null())
                    .col(
                        ColumnDef::new(Opportunities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Opportunities::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opportunities_created_by_id")
                            .from(Opportunities::Table, Opportunities::CreatedById)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Enforce the closed value sets at the DB level.
        let db = manager.get_connection();
        db.execute_unprepared(
            "ALTER TABLE opportunities ADD CONSTRAINT chk_opportunities_status_valid \
             CHECK (status IN ('active', 'closed', 'expired'))",
        )
        .await?;
        db.execute_unprepared(
            "ALTER TABLE opportunities ADD CONSTRAINT chk_opportunities_type_valid \
             CHECK (employment_type IN ('full_time', 'part_time', 'contract', 'freelance'))",
        )
        .await?;
        db.execute_unprepared(
            "ALTER TABLE opportunities ADD CONSTRAINT chk_opportunities_level_valid \
             CHECK (experience_level IN ('entry', 'intermediate', 'senior', 'expert'))",
        )
        .await?;
        db.execute_unprepared(
            "ALTER TABLE opportunities ADD CONSTRAINT chk_opportunities_budget_range \
             CHECK (budget_min IS NULL OR budget_max IS NULL OR budget_min <= budget_max)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Opportunities::Table).to_owned())
            .await
    }
}
