//! Outbound mail transport.
//!
//! The account service only knows the [`Mailer`] trait; the SMTP transport
//! and the capturing mock both live behind it so registration rollback can
//! be exercised without a mail server.

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail message: {0}")]
    Message(String),

    #[error("mail transport failure: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver the activation mail for a freshly registered account.
    async fn send_activation(&self, to: &str, token: &str) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    activation_base_url: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port);

        if let (Some(username), Some(password)) =
            (config.smtp_username.clone(), config.smtp_password.clone())
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid mail.from address '{}': {e}", config.from))?;

        Ok(Self {
            transport: builder.build(),
            from,
            activation_base_url: config.activation_base_url.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_activation(&self, to: &str, token: &str) -> Result<(), MailError> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| MailError::Message(format!("invalid recipient: {e}")))?;

        let link = format!("{}/#/login?token={token}", self.activation_base_url);
        let html = format!(
            "<div><h1>Please click the link below to activate your account</h1>\
             <div><a href=\"{link}\">Activate</a></div></div>"
        );

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Account Activation")
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| MailError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Record of a mail the [`MockMailer`] accepted.
#[derive(Debug, Clone)]
pub struct SentActivation {
    pub to: String,
    pub token: String,
}

/// Capturing mailer for tests; flip `fail` to simulate a transport outage.
#[derive(Default)]
pub struct MockMailer {
    sent: std::sync::Mutex<Vec<SentActivation>>,
    fail: std::sync::atomic::AtomicBool,
}

impl MockMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn sent(&self) -> Vec<SentActivation> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }

    #[must_use]
    pub fn last_token(&self) -> Option<String> {
        self.sent()
            .last()
            .map(|activation| activation.token.clone())
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_activation(&self, to: &str, token: &str) -> Result<(), MailError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(MailError::Transport("simulated outage".to_string()));
        }

        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(SentActivation {
                to: to.to_string(),
                token: token.to_string(),
            });

        Ok(())
    }
}
