use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;

mod smtp;

pub use smtp::SmtpMailClient;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(String),
    #[error("Failed to build email: {0}")]
    Build(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_html: Option<String>,
    pub body_text: Option<String>,
}

#[async_trait::async_trait]
pub trait MailClient: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
    fn sender(&self) -> &str;
}

pub type DynMailClient = Arc<dyn MailClient>;

/// Writes mail to the log instead of delivering it. Used when no SMTP
/// relay is configured.
pub struct LogMailClient {
    from: String,
}

impl LogMailClient {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait::async_trait]
impl MailClient for LogMailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            body = message.body_text.as_deref().unwrap_or_default(),
            "Mail delivery disabled; logging message"
        );
        Ok(())
    }

    fn sender(&self) -> &str {
        &self.from
    }
}

pub fn create_mail_client(config: &AppConfig) -> Result<DynMailClient, MailError> {
    match config.smtp_host.as_deref().filter(|h| !h.trim().is_empty()) {
        Some(host) => {
            let client = SmtpMailClient::new(
                host,
                config.smtp_port,
                config
                    .smtp_username
                    .clone()
                    .zip(config.smtp_password.clone()),
                &config.mail_from,
            )?;
            info!(host = %host, "SMTP mail delivery enabled");
            Ok(Arc::new(client))
        }
        None => Ok(Arc::new(LogMailClient::new(config.mail_from.clone()))),
    }
}

/// The message sent after registration and on resend
pub fn verification_email(to: &str, name: &str, verify_url: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Verify your MotoHub account".to_string(),
        body_text: Some(format!(
            "Hi {name},\n\nConfirm your email address by opening this link:\n{verify_url}\n\nIf you did not create an account you can ignore this message.\n"
        )),
        body_html: Some(format!(
            "<p>Hi {name},</p><p>Confirm your email address by opening <a href=\"{verify_url}\">this link</a>.</p><p>If you did not create an account you can ignore this message.</p>"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_carries_link_in_both_bodies() {
        let msg = verification_email(
            "rider@example.com",
            "Rider",
            "http://localhost:8080/api/auth/verify-email?token=abc",
        );
        assert_eq!(msg.to, "rider@example.com");
        assert!(msg.body_text.unwrap().contains("verify-email?token=abc"));
        assert!(msg.body_html.unwrap().contains("verify-email?token=abc"));
    }

    #[tokio::test]
    async fn log_client_accepts_everything() {
        let client = LogMailClient::new("MotoHub <no-reply@motohub.local>");
        let msg = verification_email("a@b.test", "A", "http://x");
        assert!(client.send(msg).await.is_ok());
        assert_eq!(client.sender(), "MotoHub <no-reply@motohub.local>");
    }

    #[test]
    fn without_smtp_host_the_log_client_is_used() {
        let cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "k".repeat(64),
            3600,
            "127.0.0.1".into(),
            8080,
            "development".into(),
        );
        let client = create_mail_client(&cfg).unwrap();
        assert_eq!(client.sender(), cfg.mail_from);
    }
}
