use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use common::types::ApiResponse;
use service::actor::Actor;
use service::payment_service;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Deserialize)]
pub struct CreatePaymentBody {
    pub provider: String,
}

#[derive(Deserialize, Default)]
pub struct CompletePaymentBody {
    pub provider_ref: Option<String>,
}

/// Open a PENDING payment for an APPROVED booking.
pub async fn create_for_booking(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<CreatePaymentBody>,
) -> Result<Json<ApiResponse<models::payment::Model>>, JsonApiError> {
    let created = payment_service::create_payment(&state.db, &actor, booking_id, &body.provider).await?;
    Ok(Json(ApiResponse::ok(created)))
}

pub async fn list_for_booking(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<models::payment::Model>>>, JsonApiError> {
    let payments = payment_service::list_payments(&state.db, &actor, booking_id).await?;
    Ok(Json(ApiResponse::ok(payments)))
}

/// Settle the payment and confirm the booking in one transaction.
pub async fn complete(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<CompletePaymentBody>,
) -> Result<Json<ApiResponse<models::payment::Model>>, JsonApiError> {
    let completed = payment_service::complete_payment(&state.db, &actor, id, body.provider_ref).await?;
    Ok(Json(ApiResponse::ok_with_message(completed, "Payment received; booking confirmed")))
}
