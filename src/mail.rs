use async_trait::async_trait;
use tracing::{debug, info};

/// Delivery of password-reset notifications.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_reset_email(&self, to: &str, token: &str) -> anyhow::Result<()>;
}

/// Sender that records reset notifications in the log instead of mailing them.
///
/// The link carries a live token, so it is only logged when `log_links` is
/// switched on (local development).
#[derive(Clone)]
pub struct LogEmailSender {
    reset_url_base: String,
    log_links: bool,
}

impl LogEmailSender {
    pub fn new(reset_url_base: impl Into<String>) -> Self {
        Self {
            reset_url_base: reset_url_base.into(),
            log_links: false,
        }
    }

    pub fn log_links(mut self, enabled: bool) -> Self {
        self.log_links = enabled;
        self
    }
}

pub fn reset_link(base: &str, token: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}token={token}")
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_reset_email(&self, to: &str, token: &str) -> anyhow::Result<()> {
        info!(to_email = %to, "password reset email queued");
        if self.log_links {
            debug!(link = %reset_link(&self.reset_url_base, token), "password reset link");
        }
        Ok(())
    }
}
