//! Migration: Create attendance table

use sea_orm_migration::prelude::*;

use super::m20251001_000001_create_profiles::Profiles;
use super::m20251001_000002_create_events::Events;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Attendance::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Attendance::UserId).uuid().not_null())
                    .col(ColumnDef::new(Attendance::EventId).uuid().not_null())
                    .col(
                        ColumnDef::new(Attendance::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Attendance::AppliedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Attendance::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Attendance::ReviewedBy).uuid().null())
                    .col(ColumnDef::new(Attendance::Notes).text().null())
                    .col(ColumnDef::new(Attendance::InviteCode).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Attendance::Table, Attendance::UserId)
                            .to(Profiles::Table, Profiles::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Attendance::Table, Attendance::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One application per user per event; concurrent inserts lose with a conflict
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_user_event")
                    .table(Attendance::Table)
                    .col(Attendance::UserId)
                    .col(Attendance::EventId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_event")
                    .table(Attendance::Table)
                    .col(Attendance::EventId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attendance::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Attendance {
    Table,
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "event_id"]
    EventId,
    Status,
    #[iden = "applied_at"]
    AppliedAt,
    #[iden = "reviewed_at"]
    ReviewedAt,
    #[iden = "reviewed_by"]
    ReviewedBy,
    Notes,
    #[iden = "invite_code"]
    InviteCode,
}
