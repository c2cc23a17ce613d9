pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_profiles;
mod m20251001_000002_create_events;
mod m20251001_000003_create_questions;
mod m20251001_000004_create_invites;
mod m20251001_000005_create_attendance;
mod m20251001_000006_create_answers;
mod m20251001_000007_create_questionnaire_drafts;
mod m20251015_000001_link_travel_questions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_profiles::Migration),
            Box::new(m20251001_000002_create_events::Migration),
            Box::new(m20251001_000003_create_questions::Migration),
            Box::new(m20251001_000004_create_invites::Migration),
            Box::new(m20251001_000005_create_attendance::Migration),
            Box::new(m20251001_000006_create_answers::Migration),
            Box::new(m20251001_000007_create_questionnaire_drafts::Migration),
            Box::new(m20251015_000001_link_travel_questions::Migration),
        ]
    }
}
