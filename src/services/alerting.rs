//! Alert delivery to chat channels.

use crate::services::reports::format_number;
use reqwest::Client;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, warn};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// A channel that accepts text messages.
pub trait Notifier: Send + Sync {
    /// Human-readable sink name.
    fn name(&self) -> &str;

    /// Whether the sink has the credentials it needs.
    fn is_configured(&self) -> bool;

    /// Deliver a message. Returns whether delivery succeeded.
    fn send<'a>(&'a self, message: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}

/// Telegram bot API notifier.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    token: Option<String>,
    chat_id: Option<String>,
    api_url: String,
}

impl TelegramNotifier {
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token,
            chat_id,
            api_url: TELEGRAM_API_URL.to_string(),
        }
    }

    /// Point the notifier at a different API host.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn post_message(&self, token: &str, chat_id: &str, message: &str) -> anyhow::Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, token);
        self.client
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": message }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "Telegram"
    }

    fn is_configured(&self) -> bool {
        self.token.is_some() && self.chat_id.is_some()
    }

    fn send<'a>(&'a self, message: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            let (Some(token), Some(chat_id)) = (self.token.as_deref(), self.chat_id.as_deref()) else {
                warn!("Telegram credentials not configured");
                return false;
            };

            match self.post_message(token, chat_id, message).await {
                Ok(()) => {
                    debug!("Telegram message sent");
                    true
                }
                Err(e) => {
                    error!("Failed to send Telegram message: {}", e);
                    false
                }
            }
        })
    }
}

/// Text of the low win rate alert.
pub fn low_win_message(bot: &str, win_rate: f64, day: u32) -> String {
    format!(
        "⚠️ {} win rate is low ({}%) on Day {}",
        bot,
        format_number(win_rate),
        day
    )
}

/// Text of the drawdown alert.
pub fn drawdown_message(bot: &str, drawdown: f64, day: u32) -> String {
    format!(
        "⚠️ {} drawdown {} SOL on Day {}",
        bot,
        format_number(drawdown),
        day
    )
}

pub async fn alert_low_win(notifier: &dyn Notifier, bot: &str, win_rate: f64, day: u32) -> bool {
    notifier.send(&low_win_message(bot, win_rate, day)).await
}

pub async fn alert_drawdown(notifier: &dyn Notifier, bot: &str, drawdown: f64, day: u32) -> bool {
    notifier.send(&drawdown_message(bot, drawdown, day)).await
}
