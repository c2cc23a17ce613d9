//! Migration: Create questionnaire_drafts table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(QuestionnaireDrafts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(QuestionnaireDrafts::Owner).string().not_null())
                    .col(ColumnDef::new(QuestionnaireDrafts::EventId).uuid().not_null())
                    .col(
                        ColumnDef::new(QuestionnaireDrafts::Answers)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(QuestionnaireDrafts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(QuestionnaireDrafts::Owner)
                            .col(QuestionnaireDrafts::EventId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(QuestionnaireDrafts::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum QuestionnaireDrafts {
    Table,
    Owner,
    #[iden = "event_id"]
    EventId,
    Answers,
    #[iden = "updated_at"]
    UpdatedAt,
}
