use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum::{Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use common::email::{templates, EmailClient};
use common::types::ApiResponse;
use service::actor::Actor;
use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::user_service;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    /// None when email delivery is not configured; sends become no-ops.
    pub email: Option<Arc<EmailClient>>,
    /// External base URL for links embedded in emails.
    pub base_url: String,
}

impl ServerState {
    fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        let repo = Arc::new(SeaOrmAuthRepository { db: self.db.clone() });
        AuthService::new(
            repo,
            AuthConfig {
                jwt_secret: Some(self.auth.jwt_secret.clone()),
                token_ttl_hours: self.auth.token_ttl_hours,
                password_algorithm: "argon2".into(),
            },
        )
    }

    pub(crate) async fn send_email(&self, recipient: &str, subject: &str, html: &str, text: &str) {
        let Some(client) = &self.email else { return };
        if let Err(e) = client.send_email(recipient, subject, html, text).await {
            warn!(error = %e, "email delivery failed");
        }
    }
}

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: Uuid }

#[derive(Serialize)]
pub struct MeOutput { pub user_id: Uuid, pub email: String, pub name: String, pub role: String }

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: Uuid, pub email: String, pub name: String, pub role: String, pub token: String }

#[derive(Deserialize)]
pub struct ForgotPasswordInput { pub email: String }

#[derive(Deserialize)]
pub struct ResetPasswordInput { pub token: String, pub new_password: String }

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<ApiResponse<RegisterOutput>>, JsonApiError> {
    models::user::validate_email(&input.email).map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
    models::user::validate_name(&input.name).map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;

    let name = input.name.clone();
    let user = state.auth_service().register(input).await?;

    // Post-commit side effect; a bounced email never fails the registration.
    let (subject, html, text) = templates::welcome(&name);
    state.send_email(&user.email, &subject, &html, &text).await;

    Ok(Json(ApiResponse::ok_with_message(
        RegisterOutput { user_id: user.id },
        "Account created",
    )))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<ApiResponse<LoginOutput>>), JsonApiError> {
    let session = state.auth_service().login(input).await?;
    let user = session.user;
    let Some(token) = session.token else {
        return Err(JsonApiError::internal("token generation failed"));
    };

    let mut cookie = Cookie::new("auth_token", token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
    let jar = jar.add(cookie);

    let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, role: user.role, token };
    Ok((jar, Json(ApiResponse::ok(out))))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<MeOutput>>, JsonApiError> {
    let user = user_service::get_user(&state.db, actor.user_id)
        .await?
        .ok_or_else(|| JsonApiError::new(StatusCode::UNAUTHORIZED, "account no longer exists"))?;
    Ok(Json(ApiResponse::ok(MeOutput {
        user_id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    })))
}

/// Always answers 200 so responses do not reveal which emails have accounts.
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(input): Json<ForgotPasswordInput>,
) -> Result<Json<ApiResponse<()>>, JsonApiError> {
    if let Some((user, token)) = state.auth_service().request_password_reset(&input.email).await? {
        let reset_link = format!("{}/reset-password?token={}", state.base_url, token);
        let (subject, html, text) = templates::password_reset(&reset_link);
        state.send_email(&user.email, &subject, &html, &text).await;
    }
    Ok(Json(ApiResponse::message_only(
        "If that email exists, a reset link is on its way",
    )))
}

pub async fn reset_password(
    State(state): State<ServerState>,
    Json(input): Json<ResetPasswordInput>,
) -> Result<Json<ApiResponse<()>>, JsonApiError> {
    state.auth_service().reset_password(&input.token, &input.new_password).await?;
    Ok(Json(ApiResponse::message_only("Password updated")))
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    uid: String,
    role: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Bearer-token guard for the protected routers. Reads `Authorization: Bearer`
/// first, falls back to the `auth_token` cookie. Missing token is 400,
/// invalid or expired is 401. On success the verified `Actor` is attached to
/// the request extensions for handlers.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    // CORS preflight passes through untouched
    if method == axum::http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let token = {
        let authz = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if let Some(h) = authz {
            let prefix = "Bearer ";
            if !h.starts_with(prefix) {
                warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(StatusCode::UNAUTHORIZED);
            }
            h[prefix.len()..].to_string()
        } else {
            // Cookie fallback for the SPA
            let cookie_header = req
                .headers()
                .get(axum::http::header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let mut token_val: Option<String> = None;
            for part in cookie_header.split(';') {
                let kv = part.trim();
                if let Some(rest) = kv.strip_prefix("auth_token=") {
                    token_val = Some(rest.to_string());
                    break;
                }
            }

            match token_val {
                Some(t) if !t.is_empty() => t,
                _ => {
                    warn!(path = %path, "missing Authorization header and auth_token cookie");
                    return Err(StatusCode::BAD_REQUEST);
                }
            }
        }
    };

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    match decode::<Claims>(&token, &key, &validation) {
        Ok(data) => {
            let claims = data.claims;
            let Ok(user_id) = claims.uid.parse::<Uuid>() else {
                warn!(path = %path, "token uid is not a uuid");
                return Err(StatusCode::UNAUTHORIZED);
            };
            req.extensions_mut().insert(Actor {
                user_id,
                email: claims.sub,
                role: claims.role,
            });
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(path = %path, err = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
