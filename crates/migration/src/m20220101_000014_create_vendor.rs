//! Create `vendor` table with FK to the owning `user`.
//! One vendor profile per user; approval status gates bookings.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vendor::Table)
                    .if_not_exists()
                    .col(uuid(Vendor::Id).primary_key())
                    .col(uuid(Vendor::OwnerId).unique_key().not_null())
                    .col(string_len(Vendor::BusinessName, 128).not_null())
                    .col(string_len(Vendor::Category, 64).not_null())
                    .col(text(Vendor::Description).not_null())
                    .col(string_len(Vendor::City, 128).not_null())
                    .col(string_len(Vendor::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Vendor::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Vendor::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vendor_owner")
                            .from(Vendor::Table, Vendor::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Vendor::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Vendor { Table, Id, OwnerId, BusinessName, Category, Description, City, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
