use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::pagination::{page_of, Pagination};
use crate::errors::ServiceError;
use common::types::Page;
use models::user;

/// Get a user by id.
pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<Option<user::Model>, ServiceError> {
    let found = user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found.filter(|u| u.deleted_at.is_none()))
}

/// Update a user's display name.
pub async fn update_user_name(db: &DatabaseConnection, id: Uuid, name: &str) -> Result<user::Model, ServiceError> {
    user::validate_name(name)?;
    let mut am: user::ActiveModel = user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("user"))?
        .into();
    am.name = Set(name.to_string());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(updated)
}

/// Soft-delete a user (marks deleted_at).
pub async fn soft_delete_user(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    user::soft_delete(db, id).await?;
    Ok(())
}

/// Hard-delete a user (removes record).
pub async fn hard_delete_user(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    user::hard_delete(db, id).await?;
    Ok(())
}

/// List live accounts, newest first (admin view).
pub async fn list_users(db: &DatabaseConnection, opts: Pagination) -> Result<Page<user::Model>, ServiceError> {
    use sea_orm::QueryOrder;
    let (page_idx, per_page) = opts.normalize();
    let paginator = user::Entity::find()
        .filter(user::Column::DeletedAt.is_null())
        .order_by_desc(user::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let items = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(page_of(items, opts, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn user_crud_service() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let email = format!("svc_{}@example.com", Uuid::new_v4());
        let u = user::create(&db, &email, "Svc User", user::ROLE_USER).await?;
        assert_eq!(u.email, email);

        let found = get_user(&db, u.id).await?.unwrap();
        assert_eq!(found.id, u.id);

        let updated = update_user_name(&db, u.id, "New Name").await?;
        assert_eq!(updated.name, "New Name");

        soft_delete_user(&db, u.id).await?;
        // soft-deleted accounts disappear from the service view
        assert!(get_user(&db, u.id).await?.is_none());

        hard_delete_user(&db, u.id).await?;
        assert!(get_user(&db, u.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn list_users_paginates() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let mut ids = Vec::new();
        for i in 0..3 {
            let u = user::create(&db, &format!("svc_{}@example.com", Uuid::new_v4()), &format!("User{i}"), user::ROLE_USER).await?;
            ids.push(u.id);
        }
        let page = list_users(&db, Pagination { page: 1, limit: 2 }).await?;
        assert_eq!(page.limit, 2);
        assert!(page.items.len() <= 2);
        assert!(page.total >= 3);
        assert_eq!(page.pages, crate::pagination::total_pages(page.total, 2));

        for id in ids { user::hard_delete(&db, id).await?; }
        Ok(())
    }
}
