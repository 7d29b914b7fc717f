use anyhow::Context as _;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::Mailbox};

use crate::domain::repository::Notifier;
use crate::domain::types::Mail;
use crate::error::AccountsServiceError;

/// SMTP notifier. Delivery failures surface as errors here; callers treat
/// them as best-effort and only log.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: &str,
    ) -> Result<Self, AccountsServiceError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .context("build SMTP transport")?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();
        let from = from
            .parse::<Mailbox>()
            .context("parse MAIL_FROM address")?;
        Ok(Self { transport, from })
    }
}

impl Notifier for SmtpNotifier {
    async fn send(&self, mail: &Mail) -> Result<(), AccountsServiceError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail
                .to
                .parse::<Mailbox>()
                .context("parse recipient address")?)
            .subject(mail.subject.clone())
            .body(mail.body.clone())
            .context("build email message")?;

        self.transport
            .send(message)
            .await
            .context("send email via SMTP")?;
        Ok(())
    }
}
