use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum::{Extension, Json};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::types::{ApiResponse, Page};
use models::booking::{self, BookingStatus};
use models::{user, vendor};
use service::actor::Actor;
use service::pagination::Pagination;
use service::{user_service, vendor_service};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

/// Route-level guard for the /admin subtree. Runs after the bearer check, so
/// the `Actor` extension is present.
pub async fn require_admin(
    Extension(actor): Extension<Actor>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !actor.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(next.run(req).await)
}

#[derive(Serialize)]
pub struct BookingCounts {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub confirmed: u64,
    pub completed: u64,
    pub cancelled: u64,
}

#[derive(Serialize)]
pub struct Stats {
    pub users: u64,
    pub vendors: u64,
    pub bookings: BookingCounts,
}

async fn count_bookings(db: &sea_orm::DatabaseConnection, status: BookingStatus) -> Result<u64, JsonApiError> {
    booking::Entity::find()
        .filter(booking::Column::Status.eq(status.as_str()))
        .count(db)
        .await
        .map_err(|e| JsonApiError::internal(e.to_string()))
}

#[utoipa::path(get, path = "/admin/stats", tag = "admin", responses((status = 200, description = "OK"), (status = 403, description = "Forbidden")))]
pub async fn stats(State(state): State<ServerState>) -> Result<Json<ApiResponse<Stats>>, JsonApiError> {
    let db = &state.db;
    let users = user::Entity::find()
        .filter(user::Column::DeletedAt.is_null())
        .count(db)
        .await
        .map_err(|e| JsonApiError::internal(e.to_string()))?;
    let vendors = vendor::Entity::find()
        .count(db)
        .await
        .map_err(|e| JsonApiError::internal(e.to_string()))?;

    let bookings = BookingCounts {
        pending: count_bookings(db, BookingStatus::Pending).await?,
        approved: count_bookings(db, BookingStatus::Approved).await?,
        rejected: count_bookings(db, BookingStatus::Rejected).await?,
        confirmed: count_bookings(db, BookingStatus::Confirmed).await?,
        completed: count_bookings(db, BookingStatus::Completed).await?,
        cancelled: count_bookings(db, BookingStatus::Cancelled).await?,
    };

    Ok(Json(ApiResponse::ok(Stats { users, vendors, bookings })))
}

#[derive(Deserialize)]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_users(
    State(state): State<ServerState>,
    Query(q): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Page<user::Model>>>, JsonApiError> {
    let opts = Pagination { page: q.page.unwrap_or(1), limit: q.limit.unwrap_or(20) };
    let page = user_service::list_users(&state.db, opts).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// Soft delete: the row stays for bookings and audit, the account stops
/// resolving everywhere else.
pub async fn delete_user(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    user_service::soft_delete_user(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct VendorStatusBody {
    pub status: String,
}

pub async fn set_vendor_status(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<VendorStatusBody>,
) -> Result<Json<ApiResponse<vendor::Model>>, JsonApiError> {
    let updated = vendor_service::set_vendor_status(&state.db, &actor, id, &body.status).await?;
    Ok(Json(ApiResponse::ok(updated)))
}
