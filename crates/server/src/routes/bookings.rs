use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use common::email::templates;
use common::types::{ApiResponse, Page};
use models::booking::BookingStatus;
use service::actor::Actor;
use service::booking_service::{self, CreateBookingInput};
use service::pagination::Pagination;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Deserialize)]
pub struct CreateBookingBody {
    pub vendor_id: Uuid,
    pub service_id: Uuid,
    pub event_date: NaiveDate,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct BookingListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<BookingStatus>,
}

#[derive(Deserialize)]
pub struct UpdateStatusBody {
    pub status: BookingStatus,
}

fn pagination(page: Option<u32>, limit: Option<u32>) -> Pagination {
    Pagination { page: page.unwrap_or(1), limit: limit.unwrap_or(20) }
}

#[utoipa::path(post, path = "/bookings", tag = "bookings", request_body = crate::openapi::CreateBookingRequest, responses((status = 200, description = "Created"), (status = 400, description = "Bad Request")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateBookingBody>,
) -> Result<Json<ApiResponse<models::booking::Model>>, JsonApiError> {
    let created = booking_service::create_booking(
        &state.db,
        &actor,
        CreateBookingInput {
            vendor_id: body.vendor_id,
            service_id: body.service_id,
            event_date: body.event_date,
            note: body.note,
        },
    )
    .await?;
    Ok(Json(ApiResponse::ok_with_message(created, "Booking request sent")))
}

/// The caller's bookings (customer view).
pub async fn list_mine(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<Page<models::booking::Model>>>, JsonApiError> {
    let page = booking_service::list_for_user(
        &state.db,
        actor.user_id,
        q.status,
        pagination(q.page, q.limit),
    )
    .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// Incoming bookings for the caller's vendor profile.
pub async fn list_for_vendor(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<Page<models::booking::Model>>>, JsonApiError> {
    let page = booking_service::list_for_vendor(
        &state.db,
        &actor,
        q.status,
        pagination(q.page, q.limit),
    )
    .await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn get(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<models::booking::Model>>, JsonApiError> {
    let booking = booking_service::get_booking(&state.db, &actor, id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

#[utoipa::path(patch, path = "/bookings/{id}/status", tag = "bookings", request_body = crate::openapi::UpdateBookingStatusRequest, responses((status = 200, description = "Updated"), (status = 403, description = "Forbidden"), (status = 409, description = "Invalid transition")))]
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<ApiResponse<models::booking::Model>>, JsonApiError> {
    let change = booking_service::update_status(&state.db, &actor, id, body.status).await?;

    // The transition is committed; email afterwards, best-effort.
    if let Some(email) = change.email {
        let (subject, html, text) = templates::booking_confirmation(
            &email.customer_name,
            &email.vendor_name,
            &email.service_title,
            &email.event_date.to_string(),
        );
        state.send_email(&email.customer_email, &subject, &html, &text).await;
    }

    Ok(Json(ApiResponse::ok(change.booking)))
}

/// Customer cancel; shorthand for `status = CANCELLED`.
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    booking_service::cancel_booking(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
