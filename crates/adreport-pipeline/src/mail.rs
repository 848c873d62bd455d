//! Outbound email transport.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::error::{PipelineError, Result};

/// Delivers a rendered report email. Implementations must not retry; the
/// pipeline treats delivery as best-effort once a report is persisted.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()>;
}

/// SMTP relay transport (STARTTLS).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: &str,
    ) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| PipelineError::Delivery(e.to_string()))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();
        let from = from
            .parse()
            .map_err(|e| PipelineError::Delivery(format!("bad from address '{from}': {e}")))?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| PipelineError::Delivery(format!("bad recipient '{to}': {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| PipelineError::Delivery(e.to_string()))?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| PipelineError::Delivery(e.to_string()))?;
        info!(%to, code = %response.code(), "report email sent");
        Ok(())
    }
}
