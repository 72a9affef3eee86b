//! Notification sender contract.

use async_trait::async_trait;

use crate::error::UpstreamError;

/// Posts one message to an external channel. Implementations do not retry;
/// the scheduler retries unsent reminders on its next run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel_id: &str, mention: &str, text: &str) -> Result<(), UpstreamError>;
}

/// `@<mention> <text>`. A leading `@` on the mention is not doubled.
pub fn format_message(mention: &str, text: &str) -> String {
    let mention = mention.trim().trim_start_matches('@');
    format!("@{mention} {text}")
}
