mod auth;
mod commands;
mod config;
mod platform;
mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::platform::telegram::{webhook_url, TelegramApi};
use crate::webhook::AppState;

enum Command {
    Serve,
    SetWebhook,
    DeleteWebhook,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,webhookbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1).peekable();
    let command = match args.peek().map(String::as_str) {
        Some("set-webhook") => Command::SetWebhook,
        Some("delete-webhook") => Command::DeleteWebhook,
        _ => Command::Serve,
    };
    if !matches!(command, Command::Serve) {
        args.next();
    }

    // Load configuration
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let api = TelegramApi::new(config.telegram.api_url.as_deref())?;

    match command {
        Command::Serve => serve(config, api).await,
        Command::SetWebhook => {
            let credentials = config.telegram.credentials()?;
            let public_url = config
                .server
                .public_url
                .as_deref()
                .context("WEBHOOK_PUBLIC_URL must be set to register the webhook")?;
            let url = webhook_url(public_url, &config.server.webhook_path);
            api.register_webhook(&credentials.bot_token, &url, &credentials.secret_token)
                .await
        }
        Command::DeleteWebhook => {
            let credentials = config.telegram.credentials()?;
            api.delete_webhook(&credentials.bot_token).await
        }
    }
}

async fn serve(config: Config, api: TelegramApi) -> Result<()> {
    if let Err(e) = config.telegram.credentials() {
        warn!("{}; webhook requests will be rejected until it is set", e);
    }

    let path = &config.server.webhook_path;
    if !path.starts_with('/') {
        anyhow::bail!("Webhook path must start with '/': {}", path);
    }

    let addr = config.server.bind_address.clone();
    let state = Arc::new(AppState::new(config.telegram.clone(), Arc::new(api)));
    let app = webhook::router(state, path);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Webhook listening on http://{}{}", addr, path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}
