//! Payments against bookings. Completing a payment is what moves a booking
//! from APPROVED to CONFIRMED; the two writes share one transaction.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::actor::Actor;
use crate::booking_service;
use crate::errors::ServiceError;
use models::booking::{self, BookingStatus};
use models::{notification, payment, service, vendor};

/// Customer opens a PENDING payment for an APPROVED booking. The amount is
/// copied from the service price at this moment.
#[instrument(skip(db), fields(actor = %actor.user_id))]
pub async fn create_payment(
    db: &DatabaseConnection,
    actor: &Actor,
    booking_id: Uuid,
    provider: &str,
) -> Result<payment::Model, ServiceError> {
    let b = booking::Entity::find_by_id(booking_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("booking"))?;
    if b.user_id != actor.user_id && !actor.is_admin() {
        return Err(ServiceError::forbidden("not your booking"));
    }
    if b.status != BookingStatus::Approved.as_str() {
        return Err(ServiceError::Validation("booking is not awaiting payment".into()));
    }
    let open = payment::Entity::find()
        .filter(payment::Column::BookingId.eq(b.id))
        .filter(payment::Column::Status.eq(payment::STATUS_PENDING))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if open.is_some() {
        return Err(ServiceError::Conflict("a pending payment already exists".into()));
    }

    let s = service::Entity::find_by_id(b.service_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("service"))?;

    let created = payment::create(db, b.id, s.price_cents, provider).await?;
    info!(payment_id = %created.id, booking_id = %b.id, "payment_created");
    Ok(created)
}

/// Mark a payment COMPLETED and confirm its booking atomically. The vendor
/// owner is notified in the same commit.
#[instrument(skip(db), fields(actor = %actor.user_id))]
pub async fn complete_payment(
    db: &DatabaseConnection,
    actor: &Actor,
    payment_id: Uuid,
    provider_ref: Option<String>,
) -> Result<payment::Model, ServiceError> {
    let p = payment::Entity::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("payment"))?;
    if p.status != payment::STATUS_PENDING {
        return Err(ServiceError::Validation("payment is not pending".into()));
    }
    let b = booking::Entity::find_by_id(p.booking_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("booking"))?;
    if b.user_id != actor.user_id && !actor.is_admin() {
        return Err(ServiceError::forbidden("not your booking"));
    }
    let v = vendor::Entity::find_by_id(b.vendor_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("vendor"))?;

    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let confirmed = booking_service::apply_status(&txn, b, BookingStatus::Confirmed).await?;

    let now = Utc::now();
    let mut am: payment::ActiveModel = p.into();
    am.status = Set(payment::STATUS_COMPLETED.into());
    am.provider_ref = Set(provider_ref);
    am.updated_at = Set(now.into());
    let completed = am.update(&txn).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    notification::create(
        &txn,
        v.owner_id,
        notification::KIND_PAYMENT_RECEIVED,
        &format!("Payment received for the booking on {}", confirmed.event_date),
    )
    .await?;
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;

    info!(payment_id = %completed.id, booking_id = %confirmed.id, "payment_completed");
    Ok(completed)
}

/// Payments of a booking, oldest first. Parties to the booking only.
pub async fn list_payments(
    db: &DatabaseConnection,
    actor: &Actor,
    booking_id: Uuid,
) -> Result<Vec<payment::Model>, ServiceError> {
    // Reuses the booking-level access check.
    let b = booking_service::get_booking(db, actor, booking_id).await?;
    payment::Entity::find()
        .filter(payment::Column::BookingId.eq(b.id))
        .order_by_asc(payment::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}
