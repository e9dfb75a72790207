use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{page_of, Pagination};
use common::types::Page;
use models::{user, vendor};

pub struct CreateVendorInput {
    pub business_name: String,
    pub category: String,
    pub description: String,
    pub city: String,
}

#[derive(Default)]
pub struct UpdateVendorInput {
    pub business_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VendorFilter<'a> {
    pub category: Option<&'a str>,
    pub city: Option<&'a str>,
    /// Admins may list PENDING/SUSPENDED profiles too.
    pub include_unapproved: bool,
}

/// Create the caller's vendor profile (one per account) and promote the
/// account to the VENDOR role. Both writes commit together.
#[instrument(skip(db, input), fields(owner = %actor.user_id))]
pub async fn create_vendor_profile(
    db: &DatabaseConnection,
    actor: &Actor,
    input: CreateVendorInput,
) -> Result<vendor::Model, ServiceError> {
    if vendor::find_by_owner(db, actor.user_id).await?.is_some() {
        return Err(ServiceError::Conflict("vendor profile already exists".into()));
    }
    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let created = vendor::create(
        &txn,
        actor.user_id,
        &input.business_name,
        &input.category,
        &input.description,
        &input.city,
    )
    .await?;

    let mut am: user::ActiveModel = user::Entity::find_by_id(actor.user_id)
        .one(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("user"))?
        .into();
    am.role = Set(user::ROLE_VENDOR.into());
    am.updated_at = Set(Utc::now().into());
    am.update(&txn).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(vendor_id = %created.id, "vendor_profile_created");
    Ok(created)
}

pub async fn get_vendor(db: &DatabaseConnection, id: Uuid) -> Result<Option<vendor::Model>, ServiceError> {
    vendor::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn vendor_for_owner(db: &DatabaseConnection, owner_id: Uuid) -> Result<Option<vendor::Model>, ServiceError> {
    Ok(vendor::find_by_owner(db, owner_id).await?)
}

/// Owner or admin edits profile fields.
pub async fn update_vendor(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    input: UpdateVendorInput,
) -> Result<vendor::Model, ServiceError> {
    let found = vendor::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("vendor"))?;
    if found.owner_id != actor.user_id && !actor.is_admin() {
        return Err(ServiceError::forbidden("not your vendor profile"));
    }

    let mut am: vendor::ActiveModel = found.into();
    if let Some(name) = input.business_name {
        vendor::validate_business_name(&name)?;
        am.business_name = Set(name);
    }
    if let Some(category) = input.category {
        if category.trim().is_empty() {
            return Err(ServiceError::Validation("category required".into()));
        }
        am.category = Set(category.to_lowercase());
    }
    if let Some(description) = input.description {
        am.description = Set(description);
    }
    if let Some(city) = input.city {
        am.city = Set(city);
    }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

/// Admin moderation: approve or suspend a profile.
#[instrument(skip(db))]
pub async fn set_vendor_status(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    status: &str,
) -> Result<vendor::Model, ServiceError> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("admin only"));
    }
    if status != vendor::STATUS_APPROVED && status != vendor::STATUS_SUSPENDED {
        return Err(ServiceError::Validation(format!("unsupported vendor status: {status}")));
    }
    let mut am: vendor::ActiveModel = vendor::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("vendor"))?
        .into();
    am.status = Set(status.to_string());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(vendor_id = %updated.id, status = %updated.status, "vendor_status_set");
    Ok(updated)
}

/// Browse vendors with optional category/city filters.
pub async fn list_vendors(
    db: &DatabaseConnection,
    filter: VendorFilter<'_>,
    opts: Pagination,
) -> Result<Page<vendor::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let mut query = vendor::Entity::find();
    if !filter.include_unapproved {
        query = query.filter(vendor::Column::Status.eq(vendor::STATUS_APPROVED));
    }
    if let Some(category) = filter.category {
        query = query.filter(vendor::Column::Category.eq(category.to_lowercase()));
    }
    if let Some(city) = filter.city {
        query = query.filter(vendor::Column::City.eq(city));
    }
    let paginator = query
        .order_by_asc(vendor::Column::BusinessName)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let items = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(page_of(items, opts, total))
}
