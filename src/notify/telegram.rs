use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::{compact_body, NotifyError};

use super::NotificationChannel;

/// Telegram Bot API `sendMessage`.
pub struct TelegramChannel {
    http: reqwest::Client,
    api_base_url: String,
    bot_token: String,
    chat_id: String,
    parse_mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'a str>,
    pub disable_web_page_preview: bool,
}

impl TelegramChannel {
    pub fn new(
        api_base_url: &str,
        bot_token: &str,
        chat_id: &str,
        parse_mode: Option<String>,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Telegram HTTP client")?;
        Ok(Self {
            http,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            parse_mode,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, self.bot_token)
    }

    pub fn request<'a>(&'a self, text: &'a str) -> SendMessageRequest<'a> {
        SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: self.parse_mode.as_deref(),
            disable_web_page_preview: true,
        }
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(&self.request(text))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: compact_body(&body),
            });
        }
        tracing::debug!(chat_id = %self.chat_id, chars = text.chars().count(), "Telegram message sent");
        Ok(())
    }
}
