use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use common::types::{ApiResponse, Page};
use service::actor::Actor;
use service::catalog_service::{self, CreateServiceInput, UpdateServiceInput};
use service::pagination::Pagination;
use service::vendor_service::{self, CreateVendorInput, UpdateVendorInput, VendorFilter};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Deserialize)]
pub struct VendorListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub city: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateVendorBody {
    pub business_name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub city: String,
}

#[derive(Deserialize, Default)]
pub struct UpdateVendorBody {
    pub business_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateServiceBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
}

#[derive(Deserialize, Default)]
pub struct UpdateServiceBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
}

#[utoipa::path(get, path = "/vendors", tag = "vendors", responses((status = 200, description = "OK")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<VendorListQuery>,
) -> Result<Json<ApiResponse<Page<models::vendor::Model>>>, JsonApiError> {
    let opts = Pagination {
        page: q.page.unwrap_or(1),
        limit: q.limit.unwrap_or(20),
    };
    let filter = VendorFilter {
        category: q.category.as_deref(),
        city: q.city.as_deref(),
        include_unapproved: actor.is_admin(),
    };
    let page = vendor_service::list_vendors(&state.db, filter, opts).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<models::vendor::Model>>, JsonApiError> {
    let vendor = vendor_service::get_vendor(&state.db, id)
        .await?
        .ok_or_else(|| JsonApiError::new(StatusCode::NOT_FOUND, "vendor not found"))?;
    Ok(Json(ApiResponse::ok(vendor)))
}

#[utoipa::path(post, path = "/vendors", tag = "vendors", request_body = crate::openapi::CreateVendorRequest, responses((status = 200, description = "Created"), (status = 409, description = "Profile exists")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateVendorBody>,
) -> Result<Json<ApiResponse<models::vendor::Model>>, JsonApiError> {
    let created = vendor_service::create_vendor_profile(
        &state.db,
        &actor,
        CreateVendorInput {
            business_name: body.business_name,
            category: body.category,
            description: body.description,
            city: body.city,
        },
    )
    .await?;
    Ok(Json(ApiResponse::ok_with_message(created, "Vendor profile created; pending approval")))
}

pub async fn update(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateVendorBody>,
) -> Result<Json<ApiResponse<models::vendor::Model>>, JsonApiError> {
    let updated = vendor_service::update_vendor(
        &state.db,
        &actor,
        id,
        UpdateVendorInput {
            business_name: body.business_name,
            category: body.category,
            description: body.description,
            city: body.city,
        },
    )
    .await?;
    Ok(Json(ApiResponse::ok(updated)))
}

/// ACTIVE services in a vendor's catalog.
pub async fn list_services(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<models::service::Model>>>, JsonApiError> {
    let services = catalog_service::list_services(&state.db, id).await?;
    Ok(Json(ApiResponse::ok(services)))
}

pub async fn create_service(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateServiceBody>,
) -> Result<Json<ApiResponse<models::service::Model>>, JsonApiError> {
    let created = catalog_service::add_service(
        &state.db,
        &actor,
        id,
        CreateServiceInput {
            title: body.title,
            description: body.description,
            price_cents: body.price_cents,
        },
    )
    .await?;
    Ok(Json(ApiResponse::ok(created)))
}

pub async fn update_service(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateServiceBody>,
) -> Result<Json<ApiResponse<models::service::Model>>, JsonApiError> {
    let updated = catalog_service::update_service(
        &state.db,
        &actor,
        id,
        UpdateServiceInput {
            title: body.title,
            description: body.description,
            price_cents: body.price_cents,
        },
    )
    .await?;
    Ok(Json(ApiResponse::ok(updated)))
}

/// Archive, not delete: bookings keep pointing at a real row.
pub async fn delete_service(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    catalog_service::archive_service(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
