use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// External base URL used when building links in outgoing emails.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Falls back to the JWT_SECRET env var.
    #[serde(default)]
    pub jwt_secret: String,
    /// Token lifetime in hours. Falls back to the JWT_EXPIRE env var.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Base URL of the HTTP email-delivery provider.
    #[serde(default)]
    pub base_url: String,
    /// Sender address for all outgoing mail.
    #[serde(default)]
    pub sender: String,
    /// Provider API token.
    #[serde(default)]
    pub auth_token: String,
    #[serde(default = "default_email_timeout_ms")]
    pub timeout_ms: u64,
}

// Absent sections must match the serde field defaults, not zeroed fields.
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_hours: default_token_ttl_hours() }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            sender: String::new(),
            auth_token: String::new(),
            timeout_ms: default_email_timeout_ms(),
        }
    }
}

fn default_base_url() -> String { "http://127.0.0.1:8080".into() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_token_ttl_hours() -> i64 { 12 }
fn default_email_timeout_ms() -> u64 { 10_000 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.email.normalize_from_env();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        if self.base_url.trim().is_empty() {
            self.base_url = default_base_url();
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // URL not present in TOML: fall back to the environment
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or via DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
        if let Ok(ttl) = std::env::var("JWT_EXPIRE") {
            if let Ok(hours) = ttl.parse::<i64>() {
                self.token_ttl_hours = hours;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token_ttl_hours <= 0 {
            return Err(anyhow!("auth.token_ttl_hours must be >= 1"));
        }
        Ok(())
    }
}

impl EmailConfig {
    pub fn normalize_from_env(&mut self) {
        if self.base_url.trim().is_empty() {
            if let Ok(v) = std::env::var("EMAIL_BASE_URL") { self.base_url = v; }
        }
        if self.sender.trim().is_empty() {
            if let Ok(v) = std::env::var("EMAIL_SENDER") { self.sender = v; }
        }
        if self.auth_token.trim().is_empty() {
            if let Ok(v) = std::env::var("EMAIL_AUTH_TOKEN") { self.auth_token = v; }
        }
    }

    /// Email is optional at startup; a config with no base_url disables delivery.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.sender.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_validate_rejects_non_postgres_url() {
        let cfg = DatabaseConfig { url: "mysql://x".into(), max_connections: 10, min_connections: 2, connect_timeout_secs: 30, idle_timeout_secs: 600, max_lifetime_secs: 3600, acquire_timeout_secs: 30, sqlx_logging: false };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn auth_validate_rejects_zero_ttl() {
        let cfg = AuthConfig { jwt_secret: "s".into(), token_ttl_hours: 0 };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn email_unconfigured_by_default() {
        assert!(!EmailConfig::default().is_configured());
    }

    #[test]
    fn toml_roundtrip_with_partial_sections() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [auth]
            jwt_secret = "top-secret"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.auth.jwt_secret, "top-secret");
        assert_eq!(cfg.auth.token_ttl_hours, 12);
    }
}
