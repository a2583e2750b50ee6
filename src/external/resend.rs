use crate::config::MailConfig;
use crate::error::{AppError, AppResult};
use crate::external::{Mailer, OutboundEmail};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// Resend HTTP API client.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    config: MailConfig,
}

impl ResendMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn format_address(email: &str, name: Option<&str>) -> String {
        match name {
            Some(name) => format!("{name} <{email}>"),
            None => email.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> AppResult<()> {
        let url = format!("{}/emails", self.config.base_url);

        let from = Self::format_address(&email.from, self.config.from_name.as_deref());
        let to = Self::format_address(&email.to, email.to_name.as_deref());

        let body = json!({
            "from": from,
            "to": [to],
            "subject": email.subject,
            "html": email.html,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("Email sent successfully: {}", email.to);
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Email failed to send: {}, Error: {}", email.to, error_text);
            Err(AppError::MailError(format!(
                "Email sending failed: {error_text}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address() {
        assert_eq!(
            ResendMailer::format_address("hello@lawnly.example", Some("Lawnly")),
            "Lawnly <hello@lawnly.example>"
        );
        assert_eq!(
            ResendMailer::format_address("hello@lawnly.example", None),
            "hello@lawnly.example"
        );
    }
}
