//! Outbound delivery of the batch digest.

pub mod telegram;

use async_trait::async_trait;

use crate::error::NotifyError;

pub use telegram::TelegramChannel;

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver one formatted message. Callers log failures and do not retry.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Writes the digest to stdout instead of a chat.
#[derive(Debug, Default)]
pub struct StdoutChannel;

#[async_trait]
impl NotificationChannel for StdoutChannel {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        println!("{}", text);
        Ok(())
    }
}
