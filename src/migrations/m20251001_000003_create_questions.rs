//! Migration: Create questions table

use sea_orm_migration::prelude::*;

use super::m20251001_000002_create_events::Events;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Questions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Questions::EventId).uuid().not_null())
                    .col(ColumnDef::new(Questions::QuestionText).text().not_null())
                    .col(
                        ColumnDef::new(Questions::QuestionType)
                            .string()
                            .not_null()
                            .default("text"),
                    )
                    .col(ColumnDef::new(Questions::Options).text().null())
                    .col(
                        ColumnDef::new(Questions::IsRequired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Questions::OrderIndex).integer().not_null())
                    .col(ColumnDef::new(Questions::Placeholder).string().null())
                    .col(ColumnDef::new(Questions::HelperText).text().null())
                    .col(ColumnDef::new(Questions::DependsOnQuestionId).uuid().null())
                    .col(ColumnDef::new(Questions::VisibleWhen).text().null())
                    .col(
                        ColumnDef::new(Questions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Questions::Table, Questions::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // order_index defines a total order within an event
        manager
            .create_index(
                Index::create()
                    .name("idx_questions_event_order")
                    .table(Questions::Table)
                    .col(Questions::EventId)
                    .col(Questions::OrderIndex)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Questions::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Questions {
    Table,
    Id,
    #[iden = "event_id"]
    EventId,
    #[iden = "question_text"]
    QuestionText,
    #[iden = "question_type"]
    QuestionType,
    Options,
    #[iden = "is_required"]
    IsRequired,
    #[iden = "order_index"]
    OrderIndex,
    Placeholder,
    #[iden = "helper_text"]
    HelperText,
    #[iden = "depends_on_question_id"]
    DependsOnQuestionId,
    #[iden = "visible_when"]
    VisibleWhen,
    #[iden = "created_at"]
    CreatedAt,
}
