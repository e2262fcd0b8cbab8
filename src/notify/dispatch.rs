//! Dispatch: SMTP via lettre for real runs, a logging stand-in for dry runs.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use tracing::info;

use crate::config::MailConfig;
use crate::error::DispatchError;

/// One composed message, addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    /// HTML body.
    pub body: String,
}

/// Sends composed notifications.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Dispatcher name for logging.
    fn name(&self) -> &str;

    async fn send(&self, notification: &Notification) -> Result<(), DispatchError>;
}

/// SMTP dispatcher.
pub struct SmtpDispatcher {
    from: Mailbox,
    transport: SmtpTransport,
}

impl SmtpDispatcher {
    pub fn new(config: &MailConfig) -> Result<Self, DispatchError> {
        let from = config
            .from_address
            .parse()
            .map_err(|e| DispatchError::InvalidAddress {
                field: "from",
                address: config.from_address.clone(),
                reason: format!("{e}"),
            })?;

        let builder = if config.tls {
            SmtpTransport::relay(&config.smtp_host)
                .map_err(|e| DispatchError::Transport(format!("SMTP relay error: {e}")))?
        } else {
            SmtpTransport::builder_dangerous(&config.smtp_host)
        };
        let mut builder = builder.port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().to_string(),
            ));
        }

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }

    fn build_message(&self, notification: &Notification) -> Result<Message, DispatchError> {
        let to: Mailbox = notification
            .to
            .parse()
            .map_err(|e| DispatchError::InvalidAddress {
                field: "to",
                address: notification.to.clone(),
                reason: format!("{e}"),
            })?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(notification.body.clone())
            .map_err(|e| DispatchError::Build {
                recipient: notification.to.clone(),
                reason: format!("{e}"),
            })
    }
}

#[async_trait]
impl Dispatcher for SmtpDispatcher {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, notification: &Notification) -> Result<(), DispatchError> {
        let message = self.build_message(notification)?;
        let transport = self.transport.clone();
        let recipient = notification.to.clone();

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| DispatchError::SendFailed {
                recipient: recipient.clone(),
                reason: format!("send task panicked: {e}"),
            })?
            .map_err(|e| DispatchError::SendFailed {
                recipient: recipient.clone(),
                reason: format!("SMTP send failed: {e}"),
            })?;

        info!("Sent notification to {recipient}");
        Ok(())
    }
}

/// Logs each notification instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

#[async_trait]
impl Dispatcher for LogDispatcher {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn send(&self, notification: &Notification) -> Result<(), DispatchError> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            bytes = notification.body.len(),
            "Dry run: notification not sent"
        );
        Ok(())
    }
}
