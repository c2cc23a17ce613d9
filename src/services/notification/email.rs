use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{ChannelType, NotificationMessage, NotificationProvider, SendResult};
use crate::config::notifications::SmtpConfig;

pub struct EmailProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    from_name: String,
}

impl EmailProvider {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
                .port(config.port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        })
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> SendResult {
        let Ok(to_mailbox) = to.parse::<Mailbox>() else {
            return SendResult::failed("Invalid recipient email address");
        };

        let from = format!("{} <{}>", self.from_name, self.from_address);
        let from_mailbox = match from
            .parse::<Mailbox>()
            .or_else(|_| self.from_address.parse::<Mailbox>())
        {
            Ok(mailbox) => mailbox,
            Err(_) => return SendResult::failed("Invalid from email address"),
        };

        let email = match Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
        {
            Ok(email) => email,
            Err(e) => return SendResult::failed(format!("Failed to build email: {}", e)),
        };

        match self.transport.send(email).await {
            Ok(_) => SendResult::ok(),
            Err(e) => SendResult::failed(format!("Failed to send email: {}", e)),
        }
    }
}

#[async_trait]
impl NotificationProvider for EmailProvider {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Email
    }

    async fn send(&self, message: &NotificationMessage) -> SendResult {
        let body = format!(
            "{}\n\n---\nQuestions? Reply to this email or visit https://ados.events",
            message.body
        );
        self.send_email(&message.recipient, &message.title, &body)
            .await
    }
}
