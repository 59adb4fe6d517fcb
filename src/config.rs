use anyhow::Context;
use serde::Deserialize;

/// Upper bound on reset-token lifetime (one week).
pub const MAX_RESET_TTL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub reset_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
}

impl PostgresConfig {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.username, self.password, self.host, self.port, self.database, self.ssl_mode
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub reset_url_base: String,
    /// Development only: log full reset links, live tokens included.
    pub log_reset_links: bool,
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => PostgresConfig::from_env()?.connection_string(),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fittrack".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "fittrack-password-reset".into()),
            reset_ttl_minutes: env_parse("RESET_TOKEN_TTL_MINUTES", 30)
                .clamp(1, MAX_RESET_TTL_MINUTES),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            jwt,
            reset_url_base: std::env::var("RESET_URL_BASE")
                .unwrap_or_else(|_| "http://localhost:8080/reset-password".into()),
            log_reset_links: env_parse("LOG_RESET_LINKS", false),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT", 8080),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
        })
    }
}

impl PostgresConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("POSTGRES_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("POSTGRES_PORT is not a valid port: {v}"))?,
            Err(_) => 5432,
        };
        Ok(Self {
            host: std::env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".into()),
            port,
            username: std::env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".into()),
            password: std::env::var("POSTGRES_PASSWORD").unwrap_or_default(),
            database: std::env::var("POSTGRES_DB").unwrap_or_else(|_| "fitness".into()),
            ssl_mode: std::env::var("POSTGRES_SSLMODE").unwrap_or_else(|_| "disable".into()),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
