use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use teloxide::payloads::SetWebhookSetters;
use teloxide::prelude::*;
use tracing::{debug, info};
use url::Url;

use crate::platform::{OutboundMessage, ReplySender};

/// Inbound webhook update. Only the fields the bot acts on are decoded;
/// candidate messages stay raw until [`Update::classify`] validates them.
#[derive(Debug, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    edited_message: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Opaque; only its presence is required
    pub message_id: serde_json::Value,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chat {
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    Message(Message),
    EditedMessage(Message),
    /// Channel posts, callback queries, membership changes, malformed messages...
    Other,
}

impl Update {
    /// Decode a webhook body. Arrays carry no update fields and yield `None`;
    /// scalars, `null` and invalid JSON are errors.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Option<Self>> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if value.is_array() {
            return Ok(None);
        }
        serde_json::from_value(value).map(Some)
    }

    pub fn classify(&self) -> UpdateKind {
        if let Some(msg) = decode_message(self.message.as_ref()) {
            return UpdateKind::Message(msg);
        }
        if let Some(msg) = decode_message(self.edited_message.as_ref()) {
            return UpdateKind::EditedMessage(msg);
        }
        UpdateKind::Other
    }
}

/// A message is only usable if it is an object with `message_id` and a `chat` object.
fn decode_message(value: Option<&serde_json::Value>) -> Option<Message> {
    let value = value?;
    if value.get("message_id").is_none()
        || !value.get("chat").is_some_and(serde_json::Value::is_object)
    {
        return None;
    }
    Message::deserialize(value).ok()
}

/// The new or edited message carried by `update`, preferring the new one.
pub fn extract_message(update: &Update) -> Option<Message> {
    match update.classify() {
        UpdateKind::Message(msg) | UpdateKind::EditedMessage(msg) => Some(msg),
        UpdateKind::Other => None,
    }
}

/// Bot API client built on teloxide. One HTTP client is shared by every
/// `Bot` handed out, so connections are pooled across webhook requests.
pub struct TelegramApi {
    client: reqwest::Client,
    api_url: Option<Url>,
}

impl TelegramApi {
    pub fn new(api_url: Option<&str>) -> Result<Self> {
        let api_url = api_url
            .map(|u| Url::parse(u).with_context(|| format!("Invalid Telegram API URL: {}", u)))
            .transpose()?;
        let client = teloxide::net::default_reqwest_settings()
            .build()
            .context("Failed to build Telegram HTTP client")?;
        Ok(Self { client, api_url })
    }

    fn bot(&self, bot_token: &str) -> Bot {
        let bot = Bot::with_client(bot_token, self.client.clone());
        match &self.api_url {
            Some(url) => bot.set_api_url(url.clone()),
            None => bot,
        }
    }

    /// Point Telegram at `webhook_url`, asking it to send `secret_token` back in
    /// the secret header of every delivery.
    pub async fn register_webhook(
        &self,
        bot_token: &str,
        webhook_url: &str,
        secret_token: &str,
    ) -> Result<()> {
        let url = Url::parse(webhook_url)
            .with_context(|| format!("Invalid webhook URL: {}", webhook_url))?;

        self.bot(bot_token)
            .set_webhook(url)
            .secret_token(secret_token.to_string())
            .await
            .context("Telegram setWebhook failed")?;

        info!("Webhook registered at {}", webhook_url);
        Ok(())
    }

    pub async fn delete_webhook(&self, bot_token: &str) -> Result<()> {
        self.bot(bot_token)
            .delete_webhook()
            .await
            .context("Telegram deleteWebhook failed")?;
        info!("Webhook removed");
        Ok(())
    }
}

#[async_trait]
impl ReplySender for TelegramApi {
    async fn send_message(&self, bot_token: &str, message: &OutboundMessage) -> Result<()> {
        self.bot(bot_token)
            .send_message(ChatId(message.chat_id), message.text.clone())
            .await
            .with_context(|| format!("Telegram sendMessage to chat {} failed", message.chat_id))?;

        debug!("Reply sent to chat {}", message.chat_id);
        Ok(())
    }
}

/// Join the public base URL and the webhook path without doubling the slash.
pub fn webhook_url(public_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        public_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
