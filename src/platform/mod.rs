pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// A reply bound for a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
}

/// Delivers replies back to the chat platform.
///
/// Retries, if any, belong to the implementation; the webhook calls this once per reply.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_message(&self, bot_token: &str, message: &OutboundMessage) -> Result<()>;
}
