use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod notifications;
pub mod payments;
pub mod vendors;

use self::auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router, including public, protected, and admin routes
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let static_dir = ServeDir::new("frontend").fallback(ServeFile::new("frontend/index.html"));

    // Public routes (static SPA, health, auth entry points)
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password));

    // Everything below requires a valid bearer token (or auth_token cookie)
    let api = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/vendors", get(vendors::list).post(vendors::create))
        .route("/vendors/:id", get(vendors::get).patch(vendors::update))
        .route(
            "/vendors/:id/services",
            get(vendors::list_services).post(vendors::create_service),
        )
        .route(
            "/services/:id",
            patch(vendors::update_service).delete(vendors::delete_service),
        )
        .route("/bookings", get(bookings::list_mine).post(bookings::create))
        .route("/bookings/vendor", get(bookings::list_for_vendor))
        .route(
            "/bookings/:id",
            get(bookings::get).delete(bookings::cancel),
        )
        .route("/bookings/:id/status", patch(bookings::update_status))
        .route(
            "/bookings/:id/payments",
            get(payments::list_for_booking).post(payments::create_for_booking),
        )
        .route("/payments/:id/complete", post(payments::complete))
        .route("/notifications", get(notifications::list))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/:id/read", patch(notifications::mark_read));

    // Admin routes carry an extra role check on top of the token guard
    let admin_routes = Router::new()
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id", delete(admin::delete_user))
        .route("/admin/vendors/:id/status", patch(admin::set_vendor_status))
        .route_layer(middleware::from_fn(admin::require_admin));

    let protected = api.merge(admin_routes).route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_bearer_token_state,
    ));

    // Compose; unmatched paths fall through to the static SPA bundle
    Router::new()
        .fallback_service(static_dir)
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // One span per request with method and path, at INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // Response line carries status and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx get logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                ),
        )
}
