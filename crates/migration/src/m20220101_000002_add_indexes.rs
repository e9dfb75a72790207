use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Vendor: browse filters
        manager
            .create_index(
                Index::create()
                    .name("idx_vendor_category")
                    .table(Vendor::Table)
                    .col(Vendor::Category)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_vendor_city")
                    .table(Vendor::Table)
                    .col(Vendor::City)
                    .to_owned(),
            )
            .await?;

        // Service: catalog lookup per vendor
        manager
            .create_index(
                Index::create()
                    .name("idx_service_vendor")
                    .table(Service::Table)
                    .col(Service::VendorId)
                    .to_owned(),
            )
            .await?;

        // Booking: customer and vendor dashboards, status filters
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_user")
                    .table(Booking::Table)
                    .col(Booking::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_vendor")
                    .table(Booking::Table)
                    .col(Booking::VendorId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_status")
                    .table(Booking::Table)
                    .col(Booking::Status)
                    .to_owned(),
            )
            .await?;

        // Payment: per-booking listing
        manager
            .create_index(
                Index::create()
                    .name("idx_payment_booking")
                    .table(Payment::Table)
                    .col(Payment::BookingId)
                    .to_owned(),
            )
            .await?;

        // Notification: inbox queries (user + unread)
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_user_read")
                    .table(Notification::Table)
                    .col(Notification::UserId)
                    .col(Notification::ReadAt)
                    .to_owned(),
            )
            .await?;

        // PasswordResetToken: sweep per user
        manager
            .create_index(
                Index::create()
                    .name("idx_password_reset_token_user")
                    .table(PasswordResetToken::Table)
                    .col(PasswordResetToken::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_vendor_category").table(Vendor::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_vendor_city").table(Vendor::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_vendor").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_user").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_vendor").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_status").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_payment_booking").table(Payment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_notification_user_read").table(Notification::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_password_reset_token_user").table(PasswordResetToken::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Vendor { Table, Category, City }

#[derive(DeriveIden)]
enum Service { Table, VendorId }

#[derive(DeriveIden)]
enum Booking { Table, UserId, VendorId, Status }

#[derive(DeriveIden)]
enum Payment { Table, BookingId }

#[derive(DeriveIden)]
enum Notification { Table, UserId, ReadAt }

#[derive(DeriveIden)]
enum PasswordResetToken { Table, UserId }
