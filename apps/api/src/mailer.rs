//! Outbound email via async SMTP. Best-effort: callers log failures and
//! never surface them to end users.

use anyhow::Result;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl Mailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .credentials(credentials)
            .build();
        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    pub async fn send_password_reset(&self, to: &str, reset_url: &str) -> Result<()> {
        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject("Vocalis - Password Reset Request")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "You requested a password reset for your Vocalis account.\n\n\
                 Open this link to choose a new password:\n{reset_url}\n\n\
                 The link expires in 1 hour. If you didn't request this, you can \
                 safely ignore this email.\n"
            ))?;

        self.transport.send(email).await?;
        Ok(())
    }
}
