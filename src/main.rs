use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod dto;
mod error;
mod extractors;
mod mail;
mod state;
#[cfg(test)]
mod testing;
mod users;
mod workouts;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "fittrack=info,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = match AppConfig::from_env() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return Err(e);
        }
    };

    let pool = match db::connect(&config).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to database");
            return Err(e);
        }
    };

    if let Err(e) = db::migrate(&pool).await {
        tracing::error!(error = %e, "migration failed");
        return Err(e);
    }

    let app = app::build_app(AppState::new(pool, config.clone()));
    app::serve(app, &config).await
}
