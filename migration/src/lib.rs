pub use sea_orm_migration::prelude::*;

mod m20251101_000001_create_users_table;
mod m20251101_000002_create_opportunities_table;
mod m20251101_000003_create_applications_table;
mod m20251103_000001_add_unique_active_application;
mod m20251103_000002_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000001_create_users_table::Migration),
            Box::new(m20251101_000002_create_opportunities_table::Migration),
            Box::new(m20251101_000003_create_applications_table::Migration),
            Box::new(m20251103_000001_add_unique_active_application::Migration),
            Box::new(m20251103_000002_add_indexes::Migration),
        ]
    }
}
