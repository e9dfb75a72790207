use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::types::{ApiResponse, Page};
use service::actor::Actor;
use service::notification_service;
use service::pagination::Pagination;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Deserialize)]
pub struct NotificationListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct UnreadCount {
    pub unread: u64,
}

pub async fn list(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<NotificationListQuery>,
) -> Result<Json<ApiResponse<Page<models::notification::Model>>>, JsonApiError> {
    let opts = Pagination { page: q.page.unwrap_or(1), limit: q.limit.unwrap_or(20) };
    let page = notification_service::list_for_user(&state.db, actor.user_id, opts).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn unread_count(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<UnreadCount>>, JsonApiError> {
    let unread = notification_service::unread_count(&state.db, actor.user_id).await?;
    Ok(Json(ApiResponse::ok(UnreadCount { unread })))
}

pub async fn mark_read(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<models::notification::Model>>, JsonApiError> {
    let read = notification_service::mark_read(&state.db, &actor, id).await?;
    Ok(Json(ApiResponse::ok(read)))
}
