//! Vendor catalog: the bookable services a vendor offers.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::actor::Actor;
use crate::errors::ServiceError;
use models::{service, vendor};

pub struct CreateServiceInput {
    pub title: String,
    pub description: String,
    pub price_cents: i64,
}

#[derive(Default)]
pub struct UpdateServiceInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
}

async fn owned_vendor(
    db: &DatabaseConnection,
    actor: &Actor,
    vendor_id: Uuid,
) -> Result<vendor::Model, ServiceError> {
    let v = vendor::Entity::find_by_id(vendor_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("vendor"))?;
    if v.owner_id != actor.user_id && !actor.is_admin() {
        return Err(ServiceError::forbidden("not your vendor profile"));
    }
    Ok(v)
}

/// Owner (or admin) adds a service to a vendor's catalog.
pub async fn add_service(
    db: &DatabaseConnection,
    actor: &Actor,
    vendor_id: Uuid,
    input: CreateServiceInput,
) -> Result<service::Model, ServiceError> {
    let v = owned_vendor(db, actor, vendor_id).await?;
    let created = service::create(db, v.id, &input.title, &input.description, input.price_cents).await?;
    Ok(created)
}

pub async fn get_service(db: &DatabaseConnection, id: Uuid) -> Result<Option<service::Model>, ServiceError> {
    service::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// ACTIVE services of a vendor, title order.
pub async fn list_services(db: &DatabaseConnection, vendor_id: Uuid) -> Result<Vec<service::Model>, ServiceError> {
    service::Entity::find()
        .filter(service::Column::VendorId.eq(vendor_id))
        .filter(service::Column::Status.eq(service::STATUS_ACTIVE))
        .order_by_asc(service::Column::Title)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn update_service(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    input: UpdateServiceInput,
) -> Result<service::Model, ServiceError> {
    let found = service::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    owned_vendor(db, actor, found.vendor_id).await?;

    let mut am: service::ActiveModel = found.into();
    if let Some(title) = input.title {
        if title.trim().is_empty() || title.len() > 128 {
            return Err(ServiceError::Validation("title required".into()));
        }
        am.title = Set(title);
    }
    if let Some(description) = input.description {
        am.description = Set(description);
    }
    if let Some(price_cents) = input.price_cents {
        if price_cents < 0 {
            return Err(ServiceError::Validation("price must not be negative".into()));
        }
        am.price_cents = Set(price_cents);
    }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

/// Archive instead of delete: existing bookings keep a valid FK target.
pub async fn archive_service(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    let found = service::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    owned_vendor(db, actor, found.vendor_id).await?;

    let mut am: service::ActiveModel = found.into();
    am.status = Set(service::STATUS_ARCHIVED.into());
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}
