//! Migration: Create invites table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invites::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Invites::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Invites::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Invites::Name).string().not_null())
                    .col(
                        ColumnDef::new(Invites::MaxUses)
                            .integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(Invites::MaxUses).gte(1)),
                    )
                    .col(
                        ColumnDef::new(Invites::UsedCount)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Invites::UsedCount).gte(0)),
                    )
                    .col(ColumnDef::new(Invites::DiscordId).string().null())
                    .col(
                        ColumnDef::new(Invites::InviteSentAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invites::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invites::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum Invites {
    Table,
    Id,
    Code,
    Name,
    #[iden = "max_uses"]
    MaxUses,
    #[iden = "used_count"]
    UsedCount,
    #[iden = "discord_id"]
    DiscordId,
    #[iden = "invite_sent_at"]
    InviteSentAt,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
