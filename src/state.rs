use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::{PgRepository, Repository};
use crate::mail::{EmailSender, LogEmailSender};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn EmailSender>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Arc<AppConfig>) -> Self {
        let mailer = Arc::new(
            LogEmailSender::new(config.reset_url_base.clone()).log_links(config.log_reset_links),
        );
        Self::from_parts(Arc::new(PgRepository::new(pool)), config, mailer)
    }

    pub fn from_parts(
        repo: Arc<dyn Repository>,
        config: Arc<AppConfig>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            repo,
            config,
            mailer,
        }
    }
}
