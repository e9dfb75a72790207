use chrono::{NaiveDate, Utc};
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{errors, service, user, vendor};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub vendor_id: Uuid,
    pub service_id: Uuid,
    pub event_date: Date,
    pub note: Option<String>,
    pub status: String,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Vendor,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Vendor => Entity::belongs_to(vendor::Entity)
                .from(Column::VendorId)
                .to(vendor::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Booking lifecycle. The string form is what lands in the `status` column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    /// The full transition table; anything not listed is rejected.
    pub fn can_transition(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, Confirmed)
                | (Approved, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        use BookingStatus::*;
        matches!(self, Rejected | Completed | Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = errors::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "COMPLETED" => Ok(BookingStatus::Completed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(errors::ModelError::Validation(format!("unknown booking status: {other}"))),
        }
    }
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    vendor_id: Uuid,
    service_id: Uuid,
    event_date: NaiveDate,
    note: Option<String>,
) -> Result<Model, errors::ModelError> {
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        vendor_id: Set(vendor_id),
        service_id: Set(service_id),
        event_date: Set(event_date),
        note: Set(note),
        status: Set(BookingStatus::Pending.as_str().into()),
        approved_at: Set(None),
        completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;
    use super::*;

    #[test]
    fn pending_fans_out_to_review_outcomes() {
        assert!(Pending.can_transition(Approved));
        assert!(Pending.can_transition(Rejected));
        assert!(Pending.can_transition(Cancelled));
        assert!(!Pending.can_transition(Confirmed));
        assert!(!Pending.can_transition(Completed));
    }

    #[test]
    fn approved_waits_for_payment_or_cancellation() {
        assert!(Approved.can_transition(Confirmed));
        assert!(Approved.can_transition(Cancelled));
        assert!(!Approved.can_transition(Completed));
        assert!(!Approved.can_transition(Pending));
    }

    #[test]
    fn confirmed_ends_in_completion_or_cancellation() {
        assert!(Confirmed.can_transition(Completed));
        assert!(Confirmed.can_transition(Cancelled));
        assert!(!Confirmed.can_transition(Approved));
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for terminal in [Rejected, Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Pending, Approved, Rejected, Confirmed, Completed, Cancelled] {
                assert!(!terminal.can_transition(next), "{terminal} -> {next} must be rejected");
            }
        }
    }

    #[test]
    fn no_self_transitions() {
        for s in [Pending, Approved, Rejected, Confirmed, Completed, Cancelled] {
            assert!(!s.can_transition(s));
        }
    }

    #[test]
    fn status_string_roundtrip() {
        for s in [Pending, Approved, Rejected, Confirmed, Completed, Cancelled] {
            assert_eq!(s.as_str().parse::<BookingStatus>().unwrap(), s);
        }
        assert!("ARCHIVED".parse::<BookingStatus>().is_err());
    }
}
