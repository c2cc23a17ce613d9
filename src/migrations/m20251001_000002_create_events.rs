//! Migration: Create events table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::Name).string().not_null())
                    .col(ColumnDef::new(Events::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Events::Description).text().null())
                    .col(ColumnDef::new(Events::LongDescription).text().null())
                    .col(ColumnDef::new(Events::Date).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Events::EndDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Events::Location).string().null())
                    .col(ColumnDef::new(Events::MaxAttendees).integer().null())
                    .col(
                        ColumnDef::new(Events::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Events::BannerImageUrl).string().null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Events::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Events {
    Table,
    Id,
    Name,
    Slug,
    Description,
    #[iden = "long_description"]
    LongDescription,
    Date,
    #[iden = "end_date"]
    EndDate,
    Location,
    #[iden = "max_attendees"]
    MaxAttendees,
    #[iden = "is_active"]
    IsActive,
    #[iden = "banner_image_url"]
    BannerImageUrl,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
