use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct CreateVendorRequest {
    pub business_name: String,
    pub category: String,
    pub description: Option<String>,
    pub city: String,
}

#[derive(utoipa::ToSchema)]
pub struct CreateBookingRequest {
    pub vendor_id: Uuid,
    pub service_id: Uuid,
    /// ISO date of the event, e.g. 2031-06-14
    pub event_date: String,
    pub note: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct UpdateBookingStatusRequest {
    /// One of APPROVED, REJECTED, COMPLETED, CANCELLED
    pub status: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::vendors::list,
        crate::routes::vendors::create,
        crate::routes::bookings::create,
        crate::routes::bookings::update_status,
        crate::routes::admin::stats,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CreateVendorRequest,
            CreateBookingRequest,
            UpdateBookingStatusRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "vendors"),
        (name = "bookings"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
