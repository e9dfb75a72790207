use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::json;
use tower::Service;
use uuid::Uuid;

use server::routes::{self, auth};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect().await?;
    // Run migrations to ensure schema (re-running may hit unique constraints; ignore those)
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 12 },
        email: None,
        base_url: "http://localhost".into(),
    };
    Ok(routes::build_router(cors(), state))
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn test_register_and_login_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let mut app = build_app().await?;

    let email = format!("user_{}@example.com", Uuid::new_v4());
    let name = "Tester";
    let password = "S3curePass!";

    // Register
    let req = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": email, "name": name, "password": password}))?))?;
    let resp = app.call(req).await?;
    eprintln!("register status={}", resp.status());
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["user_id"].is_string());

    // Login
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": email, "password": password}))?))?;
    let resp = app.call(req).await?;
    eprintln!("login status={}", resp.status());
    assert_eq!(resp.status(), StatusCode::OK);
    // Must set cookie
    let cookie = resp.headers().get("set-cookie").cloned();
    assert!(cookie.is_some());
    let body = body_json(resp).await?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_email_is_400() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let mut app = build_app().await?;

    let email = format!("user_{}@example.com", Uuid::new_v4());
    let payload = json!({"email": email, "name": "Tester", "password": "StrongPass123"});

    let req = Request::builder().method("POST").uri("/auth/register").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload)?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().method("POST").uri("/auth/register").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload)?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let mut app = build_app().await?;

    let email = format!("user_{}@example.com", Uuid::new_v4());

    let req = Request::builder().method("POST").uri("/auth/register").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": email, "name": "Tester", "password": "StrongPass123"}))?))?;
    let _ = app.call(req).await?;

    let req = Request::builder().method("POST").uri("/auth/login").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": email, "password": "wrong"}))?))?;
    let resp = app.call(req).await?;
    eprintln!("login wrong pass status={}", resp.status());
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_register_short_password_rejected() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let mut app = build_app().await?;

    let req = Request::builder().method("POST").uri("/auth/register").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": format!("u_{}@b.com", Uuid::new_v4()), "name": "A", "password": "short"}))?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_forgot_password_is_silent_for_unknown_email() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let mut app = build_app().await?;

    let req = Request::builder().method("POST").uri("/auth/forgot-password").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": format!("ghost_{}@example.com", Uuid::new_v4())}))?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn test_protected_route_requires_token() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let mut app = build_app().await?;

    let req = Request::builder().method("GET").uri("/bookings").body(Body::empty())?;
    let resp = app.call(req).await?;
    // Missing Authorization and auth_token cookie -> 400
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
