use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{page_of, Pagination};
use common::types::Page;
use models::notification;

/// The caller's notifications, newest first.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    opts: Pagination,
) -> Result<Page<notification::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let paginator = notification::Entity::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let items = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(page_of(items, opts, total))
}

pub async fn unread_count(db: &DatabaseConnection, user_id: Uuid) -> Result<u64, ServiceError> {
    notification::Entity::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::ReadAt.is_null())
        .count(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Mark one of the caller's notifications read. Idempotent.
pub async fn mark_read(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
) -> Result<notification::Model, ServiceError> {
    let found = notification::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("notification"))?;
    if found.user_id != actor.user_id {
        return Err(ServiceError::forbidden("not your notification"));
    }
    if found.read_at.is_some() {
        return Ok(found);
    }
    let mut am: notification::ActiveModel = found.into();
    am.read_at = Set(Some(Utc::now().into()));
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}
