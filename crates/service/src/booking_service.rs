//! Booking workflow: creation, guarded status transitions and their
//! notification side effects.
//!
//! Every state change and the notification it produces are committed in a
//! single transaction. Email never happens here; callers get back what they
//! need to send it after commit, so a failed delivery cannot undo or block a
//! committed transition.

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{page_of, Pagination};
use common::types::Page;
use models::booking::{self, BookingStatus};
use models::{notification, service, user, vendor};

pub struct CreateBookingInput {
    pub vendor_id: Uuid,
    pub service_id: Uuid,
    pub event_date: NaiveDate,
    pub note: Option<String>,
}

/// What the HTTP layer needs to send the booking-confirmation email after the
/// transition committed.
pub struct ApprovalEmail {
    pub customer_email: String,
    pub customer_name: String,
    pub vendor_name: String,
    pub service_title: String,
    pub event_date: NaiveDate,
}

pub struct StatusChange {
    pub booking: booking::Model,
    pub email: Option<ApprovalEmail>,
}

/// Create a PENDING booking plus the vendor's notification, atomically.
#[instrument(skip(db, input), fields(customer = %actor.user_id, vendor_id = %input.vendor_id))]
pub async fn create_booking(
    db: &DatabaseConnection,
    actor: &Actor,
    input: CreateBookingInput,
) -> Result<booking::Model, ServiceError> {
    let v = vendor::Entity::find_by_id(input.vendor_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("vendor"))?;
    if v.status != vendor::STATUS_APPROVED {
        return Err(ServiceError::Validation("vendor is not accepting bookings".into()));
    }
    if v.owner_id == actor.user_id {
        return Err(ServiceError::Validation("cannot book your own service".into()));
    }

    let s = service::Entity::find_by_id(input.service_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    // The booked service must belong to the stated vendor.
    if s.vendor_id != v.id {
        return Err(ServiceError::Validation("service does not belong to this vendor".into()));
    }
    if s.status != service::STATUS_ACTIVE {
        return Err(ServiceError::Validation("service is not bookable".into()));
    }
    if input.event_date < Utc::now().date_naive() {
        return Err(ServiceError::Validation("event date is in the past".into()));
    }

    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let created = booking::create(&txn, actor.user_id, v.id, s.id, input.event_date, input.note).await?;
    notification::create(
        &txn,
        v.owner_id,
        notification::KIND_BOOKING_REQUESTED,
        &format!("New booking request for {} on {}", s.title, input.event_date),
    )
    .await?;
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;

    info!(booking_id = %created.id, "booking_created");
    Ok(created)
}

pub async fn get_booking(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
) -> Result<booking::Model, ServiceError> {
    let b = booking::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("booking"))?;
    authorize_party(db, actor, &b).await?;
    Ok(b)
}

/// The caller's own bookings (customer view), newest first.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    status: Option<BookingStatus>,
    opts: Pagination,
) -> Result<Page<booking::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let mut query = booking::Entity::find().filter(booking::Column::UserId.eq(user_id));
    if let Some(status) = status {
        query = query.filter(booking::Column::Status.eq(status.as_str()));
    }
    let paginator = query
        .order_by_desc(booking::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let items = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(page_of(items, opts, total))
}

/// Incoming bookings for the caller's vendor profile.
pub async fn list_for_vendor(
    db: &DatabaseConnection,
    actor: &Actor,
    status: Option<BookingStatus>,
    opts: Pagination,
) -> Result<Page<booking::Model>, ServiceError> {
    let v = vendor::find_by_owner(db, actor.user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("vendor profile"))?;
    let (page_idx, per_page) = opts.normalize();
    let mut query = booking::Entity::find().filter(booking::Column::VendorId.eq(v.id));
    if let Some(status) = status {
        query = query.filter(booking::Column::Status.eq(status.as_str()));
    }
    let paginator = query
        .order_by_desc(booking::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let items = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(page_of(items, opts, total))
}

/// Guarded transition via the public status endpoint.
///
/// CONFIRMED is deliberately unreachable here: it is only entered by
/// `payment_service::complete_payment`, which couples it to a payment row.
#[instrument(skip(db), fields(actor = %actor.user_id))]
pub async fn update_status(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    next: BookingStatus,
) -> Result<StatusChange, ServiceError> {
    if next == BookingStatus::Pending {
        return Err(ServiceError::InvalidTransition("bookings start as PENDING".into()));
    }
    if next == BookingStatus::Confirmed {
        return Err(ServiceError::InvalidTransition(
            "CONFIRMED is reached through payment completion".into(),
        ));
    }

    let b = booking::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("booking"))?;
    let v = vendor::Entity::find_by_id(b.vendor_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("vendor"))?;

    let is_vendor_owner = v.owner_id == actor.user_id;
    let is_customer = b.user_id == actor.user_id;
    let allowed = match next {
        BookingStatus::Approved | BookingStatus::Rejected | BookingStatus::Completed => {
            is_vendor_owner || actor.is_admin()
        }
        BookingStatus::Cancelled => is_customer || actor.is_admin(),
        _ => false,
    };
    if !allowed {
        return Err(ServiceError::forbidden("not allowed to change this booking"));
    }

    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let updated = apply_status(&txn, b, next).await?;

    // Vendor-driven outcomes notify the customer; a cancellation notifies the vendor.
    let (recipient, body) = match next {
        BookingStatus::Cancelled => (
            v.owner_id,
            format!("Booking for {} was cancelled", updated.event_date),
        ),
        _ => (
            updated.user_id,
            format!("Your booking for {} is now {}", updated.event_date, updated.status),
        ),
    };
    notification::create(&txn, recipient, notification::KIND_BOOKING_STATUS, &body).await?;

    let email = if next == BookingStatus::Approved {
        let customer = user::Entity::find_by_id(updated.user_id)
            .one(&txn)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("user"))?;
        let s = service::Entity::find_by_id(updated.service_id)
            .one(&txn)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("service"))?;
        Some(ApprovalEmail {
            customer_email: customer.email,
            customer_name: customer.name,
            vendor_name: v.business_name.clone(),
            service_title: s.title,
            event_date: updated.event_date,
        })
    } else {
        None
    };
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;

    info!(booking_id = %updated.id, status = %updated.status, "booking_status_changed");
    Ok(StatusChange { booking: updated, email })
}

/// Customer-side cancel; sugar over `update_status`.
pub async fn cancel_booking(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<booking::Model, ServiceError> {
    let change = update_status(db, actor, id, BookingStatus::Cancelled).await?;
    Ok(change.booking)
}

/// Write the next status plus its timestamps. Shared with the payment flow,
/// which runs it inside its own transaction.
pub(crate) async fn apply_status<C: ConnectionTrait>(
    conn: &C,
    b: booking::Model,
    next: BookingStatus,
) -> Result<booking::Model, ServiceError> {
    let current: BookingStatus = b.status.parse()?;
    if !current.can_transition(next) {
        return Err(ServiceError::InvalidTransition(format!("{current} -> {next}")));
    }
    let now = Utc::now();
    let mut am: booking::ActiveModel = b.into();
    am.status = Set(next.as_str().into());
    if next == BookingStatus::Approved {
        am.approved_at = Set(Some(now.into()));
    }
    if next == BookingStatus::Completed {
        am.completed_at = Set(Some(now.into()));
    }
    am.updated_at = Set(now.into());
    am.update(conn).await.map_err(|e| ServiceError::Db(e.to_string()))
}

async fn authorize_party(
    db: &DatabaseConnection,
    actor: &Actor,
    b: &booking::Model,
) -> Result<(), ServiceError> {
    if b.user_id == actor.user_id || actor.is_admin() {
        return Ok(());
    }
    let v = vendor::Entity::find_by_id(b.vendor_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("vendor"))?;
    if v.owner_id == actor.user_id {
        return Ok(());
    }
    Err(ServiceError::forbidden("not a party to this booking"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::Duration;

    struct Fixture {
        customer: user::Model,
        owner: user::Model,
        vendor: vendor::Model,
        service: service::Model,
    }

    async fn fixture(db: &DatabaseConnection) -> anyhow::Result<Fixture> {
        let customer = user::create(db, &format!("svc_{}@example.com", Uuid::new_v4()), "Couple", user::ROLE_USER).await?;
        let owner = user::create(db, &format!("svc_{}@example.com", Uuid::new_v4()), "Owner", user::ROLE_VENDOR).await?;
        let mut vam: vendor::ActiveModel = vendor::create(db, owner.id, "Shutterbug Studio", "photography", "", "Denver").await?.into();
        vam.status = Set(vendor::STATUS_APPROVED.into());
        let vendor = vam.update(db).await?;
        let service = service::create(db, vendor.id, "Full-day coverage", "", 320_000).await?;
        Ok(Fixture { customer, owner, vendor, service })
    }

    fn actor_of(u: &user::Model) -> Actor {
        Actor { user_id: u.id, email: u.email.clone(), role: u.role.clone() }
    }

    fn future_date() -> NaiveDate {
        (Utc::now() + Duration::days(90)).date_naive()
    }

    #[tokio::test]
    async fn booking_lifecycle_happy_path() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let fx = fixture(&db).await?;
        let customer = actor_of(&fx.customer);
        let owner = actor_of(&fx.owner);

        let b = create_booking(
            &db,
            &customer,
            CreateBookingInput { vendor_id: fx.vendor.id, service_id: fx.service.id, event_date: future_date(), note: None },
        )
        .await?;
        assert_eq!(b.status, "PENDING");

        // vendor got a notification in the same commit
        let inbox = notification::Entity::find()
            .filter(notification::Column::UserId.eq(fx.owner.id))
            .all(&db)
            .await?;
        assert!(inbox.iter().any(|n| n.kind == notification::KIND_BOOKING_REQUESTED));

        let change = update_status(&db, &owner, b.id, BookingStatus::Approved).await?;
        assert_eq!(change.booking.status, "APPROVED");
        assert!(change.booking.approved_at.is_some());
        let email = change.email.expect("approval email payload");
        assert_eq!(email.customer_email, fx.customer.email);
        assert_eq!(email.vendor_name, "Shutterbug Studio");

        user::hard_delete(&db, fx.customer.id).await?;
        user::hard_delete(&db, fx.owner.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn create_booking_enforces_vendor_service_pairing() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let fx = fixture(&db).await?;
        let other = fixture(&db).await?;
        let customer = actor_of(&fx.customer);

        // other vendor's service under fx.vendor's id
        let err = create_booking(
            &db,
            &customer,
            CreateBookingInput { vendor_id: fx.vendor.id, service_id: other.service.id, event_date: future_date(), note: None },
        )
        .await;
        assert!(matches!(err, Err(ServiceError::Validation(_))));

        // past event date
        let err = create_booking(
            &db,
            &customer,
            CreateBookingInput {
                vendor_id: fx.vendor.id,
                service_id: fx.service.id,
                event_date: (Utc::now() - Duration::days(1)).date_naive(),
                note: None,
            },
        )
        .await;
        assert!(matches!(err, Err(ServiceError::Validation(_))));

        for u in [fx.customer.id, fx.owner.id, other.customer.id, other.owner.id] {
            user::hard_delete(&db, u).await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn status_guards_hold() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let fx = fixture(&db).await?;
        let customer = actor_of(&fx.customer);
        let owner = actor_of(&fx.owner);

        let b = create_booking(
            &db,
            &customer,
            CreateBookingInput { vendor_id: fx.vendor.id, service_id: fx.service.id, event_date: future_date(), note: None },
        )
        .await?;

        // customer cannot approve their own booking
        let err = update_status(&db, &customer, b.id, BookingStatus::Approved).await;
        assert!(matches!(err, Err(ServiceError::Forbidden(_))));

        // CONFIRMED is payment-only
        let err = update_status(&db, &owner, b.id, BookingStatus::Confirmed).await;
        assert!(matches!(err, Err(ServiceError::InvalidTransition(_))));

        // PENDING -> COMPLETED skips the workflow
        let err = update_status(&db, &owner, b.id, BookingStatus::Completed).await;
        assert!(matches!(err, Err(ServiceError::InvalidTransition(_))));

        // customer cancels; terminal afterwards
        let cancelled = cancel_booking(&db, &customer, b.id).await?;
        assert_eq!(cancelled.status, "CANCELLED");
        let err = update_status(&db, &owner, b.id, BookingStatus::Approved).await;
        assert!(matches!(err, Err(ServiceError::InvalidTransition(_))));

        user::hard_delete(&db, fx.customer.id).await?;
        user::hard_delete(&db, fx.owner.id).await?;
        Ok(())
    }
}
