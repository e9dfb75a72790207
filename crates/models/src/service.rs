use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors, vendor};

pub const STATUS_ACTIVE: &str = "ACTIVE";
pub const STATUS_ARCHIVED: &str = "ARCHIVED";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Vendor }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Vendor => Entity::belongs_to(vendor::Entity)
                .from(Column::VendorId)
                .to(vendor::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    vendor_id: Uuid,
    title: &str,
    description: &str,
    price_cents: i64,
) -> Result<Model, errors::ModelError> {
    if title.trim().is_empty() || title.len() > 128 {
        return Err(errors::ModelError::Validation("title required".into()));
    }
    if price_cents < 0 {
        return Err(errors::ModelError::Validation("price must not be negative".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor_id),
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        price_cents: Set(price_cents),
        status: Set(STATUS_ACTIVE.into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_rejects_negative_price() {
        // Validation fires before any database work, so a mock-free call is fine.
        let db = sea_orm::DatabaseConnection::Disconnected;
        let err = create(&db, Uuid::new_v4(), "Cake", "Three tiers", -1).await.unwrap_err();
        assert!(matches!(err, errors::ModelError::Validation(_)));
    }
}
