use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::email::EmailClient;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, auth};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr(cfg: Option<&configs::AppConfig>) -> anyhow::Result<SocketAddr> {
    let (host, port) = match cfg {
        Some(cfg) => (cfg.server.host.clone(), cfg.server.port),
        None => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8081);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

fn auth_config_from_env() -> auth::ServerAuthConfig {
    auth::ServerAuthConfig {
        jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string()),
        token_ttl_hours: env::var("JWT_EXPIRE").ok().and_then(|v| v.parse().ok()).unwrap_or(12),
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    common::env::ensure_env("frontend").await?;

    // Configuration is optional; every section has an env fallback.
    let cfg = configs::AppConfig::load_and_validate().ok();

    // DB connection
    let db = match &cfg {
        Some(cfg) => {
            let db_cfg = models::db::DatabaseConfig::from_section(&cfg.database);
            models::db::connect_with_config(&db_cfg).await?
        }
        None => models::db::connect().await?,
    };

    let auth_cfg = match &cfg {
        Some(cfg) if !cfg.auth.jwt_secret.trim().is_empty() => auth::ServerAuthConfig {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            token_ttl_hours: cfg.auth.token_ttl_hours,
        },
        _ => auth_config_from_env(),
    };

    let email_cfg = match &cfg {
        Some(cfg) => cfg.email.clone(),
        None => {
            let mut section = configs::EmailConfig::default();
            section.normalize_from_env();
            section
        }
    };
    let email = EmailClient::from_config(&email_cfg).map(Arc::new);
    if email.is_none() {
        info!("email delivery not configured; transactional mail disabled");
    }

    let base_url = match &cfg {
        Some(cfg) => cfg.server.base_url.clone(),
        None => env::var("BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8081".to_string()),
    };

    let state = auth::ServerState { db, auth: auth_cfg, email, base_url };

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(cors, state);

    // Bind and serve
    let addr = load_bind_addr(cfg.as_ref())?;
    info!(%addr, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
