use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::webhook::WebhookError;

pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const SECRET_TOKEN_VAR: &str = "TELEGRAM_SECRET_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Shared secret Telegram echoes back in the webhook secret header
    #[serde(default)]
    pub secret_token: Option<String>,
    /// Bot API base URL override (self-hosted Bot API server)
    #[serde(default)]
    pub api_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    /// Public base URL Telegram should call, only needed for `set-webhook`
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            webhook_path: default_webhook_path(),
            public_url: None,
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_webhook_path() -> String {
    "/api/telegram".to_string()
}

/// Credentials resolved for a single webhook request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub secret_token: String,
}

impl TelegramConfig {
    /// Both values must be present and non-empty. An empty secret is treated
    /// as missing so the webhook never runs unauthenticated.
    pub fn credentials(&self) -> Result<Credentials, WebhookError> {
        Ok(Credentials {
            bot_token: required(BOT_TOKEN_VAR, self.bot_token.as_deref())?,
            secret_token: required(SECRET_TOKEN_VAR, self.secret_token.as_deref())?,
        })
    }
}

fn required(name: &str, value: Option<&str>) -> Result<String, WebhookError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(WebhookError::Configuration(format!(
            "Missing required environment variable: {}",
            name
        ))),
    }
}

impl Config {
    /// Load from an optional TOML file, then overlay the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Overlay values from `lookup`; unset or empty variables leave the file value alone.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(v) = get(BOT_TOKEN_VAR) {
            self.telegram.bot_token = Some(v);
        }
        if let Some(v) = get(SECRET_TOKEN_VAR) {
            self.telegram.secret_token = Some(v);
        }
        if let Some(v) = get("TELEGRAM_API_URL") {
            self.telegram.api_url = Some(v);
        }
        if let Some(v) = get("WEBHOOK_BIND_ADDRESS") {
            self.server.bind_address = v;
        }
        if let Some(v) = get("WEBHOOK_PATH") {
            self.server.webhook_path = v;
        }
        if let Some(v) = get("WEBHOOK_PUBLIC_URL") {
            self.server.public_url = Some(v);
        }
    }
}
