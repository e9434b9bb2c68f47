//! Trade source backed by the Helius enhanced transactions API.

use crate::config::is_wallet_configured;
use crate::services::analytics::classify_strategy;
use crate::types::Trade;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Supplies new trades for a bot wallet.
///
/// Implementations never fail: network or parse problems are logged and
/// yield an empty batch. Returned trades are in chronological order.
///
/// `since` is inclusive so trades sharing the last logged second are not
/// lost; callers drop the ones already logged (see `TradeLog::is_logged`).
pub trait TradeSource: Send + Sync {
    /// Trades for `wallet` at or after `since`, attributed to `bot`.
    fn fetch_trades<'a>(
        &'a self,
        wallet: &'a str,
        bot: &'a str,
        since: Option<i64>,
    ) -> Pin<Box<dyn Future<Output = Vec<Trade>> + Send + 'a>>;
}

/// Native SOL transfer inside an enhanced transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NativeTransfer {
    #[serde(default)]
    from_user_account: Option<String>,
    #[serde(default)]
    to_user_account: Option<String>,
    #[serde(default)]
    amount: i64,
}

/// Token transfer inside an enhanced transaction.
#[derive(Debug, Deserialize)]
struct TokenTransfer {
    #[serde(default)]
    mint: Option<String>,
}

/// Subset of a Helius enhanced transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnhancedTransaction {
    #[serde(default)]
    signature: Option<String>,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    memo: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    native_transfers: Vec<NativeTransfer>,
    #[serde(default)]
    token_transfers: Vec<TokenTransfer>,
}

impl EnhancedTransaction {
    /// Net SOL received by `wallet` in this transaction.
    fn net_sol(&self, wallet: &str) -> f64 {
        let lamports: i64 = self
            .native_transfers
            .iter()
            .map(|t| {
                let incoming = t.to_user_account.as_deref() == Some(wallet);
                let outgoing = t.from_user_account.as_deref() == Some(wallet);
                match (incoming, outgoing) {
                    (true, false) => t.amount,
                    (false, true) => -t.amount,
                    _ => 0,
                }
            })
            .sum();
        lamports as f64 / LAMPORTS_PER_SOL
    }

    fn memo(&self) -> Option<&str> {
        self.memo
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.description.as_deref())
            .filter(|m| !m.is_empty())
    }

    fn symbol(&self) -> Option<&str> {
        self.token_transfers.iter().find_map(|t| t.mint.as_deref())
    }
}

/// Turn a Helius transactions payload into trades for one bot.
///
/// Malformed entries and transactions that move no SOL for the wallet are
/// dropped, as is anything before `since`.
pub fn parse_transactions(
    payload: &serde_json::Value,
    wallet: &str,
    bot: &str,
    since: Option<i64>,
) -> Vec<Trade> {
    let Some(items) = payload.as_array() else {
        warn!("Unexpected Helius payload for {}: not an array", bot);
        return Vec::new();
    };

    let mut trades: Vec<Trade> = items
        .iter()
        .filter_map(|item| match serde_json::from_value::<EnhancedTransaction>(item.clone()) {
            Ok(tx) => Some(tx),
            Err(e) => {
                debug!("Skipping unparseable transaction for {}: {}", bot, e);
                None
            }
        })
        .filter(|tx| since.map_or(true, |s| tx.timestamp >= s))
        .filter_map(|tx| {
            let pnl = tx.net_sol(wallet);
            if pnl == 0.0 {
                return None;
            }
            let memo = tx.memo();
            let mut trade = Trade::new(pnl, tx.timestamp)
                .ok()?
                .with_strategy(classify_strategy(memo))
                .with_agent(bot);
            if let Some(memo) = memo {
                trade = trade.with_trigger(memo);
            }
            if let Some(symbol) = tx.symbol() {
                trade = trade.with_symbol(symbol);
            }
            if let Some(signature) = tx.signature.as_deref() {
                trade = trade.with_signature(signature);
            }
            Some(trade)
        })
        .collect();

    // Helius returns newest first
    trades.sort_by_key(|t| t.timestamp());
    trades
}

/// Helius REST client.
#[derive(Clone)]
pub struct HeliusClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl HeliusClient {
    /// Create a new Helius client.
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent("tourney/0.1 (bot tournament tracker)")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_transactions(&self, wallet: &str, api_key: &str) -> anyhow::Result<serde_json::Value> {
        let url = format!("{}/addresses/{}/transactions", self.base_url, wallet);
        let response = self
            .client
            .get(&url)
            .query(&[("api-key", api_key)])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl TradeSource for HeliusClient {
    fn fetch_trades<'a>(
        &'a self,
        wallet: &'a str,
        bot: &'a str,
        since: Option<i64>,
    ) -> Pin<Box<dyn Future<Output = Vec<Trade>> + Send + 'a>> {
        Box::pin(async move {
            if !is_wallet_configured(wallet) {
                info!("Skipping {} - wallet address not configured", bot);
                return Vec::new();
            }
            let Some(api_key) = self.api_key.as_deref() else {
                warn!("Skipping {} - HELIUS_API_KEY not configured", bot);
                return Vec::new();
            };

            match self.fetch_transactions(wallet, api_key).await {
                Ok(payload) => {
                    let trades = parse_transactions(&payload, wallet, bot, since);
                    info!("Fetched {} new trades for {}", trades.len(), bot);
                    trades
                }
                Err(e) => {
                    error!("Error fetching trades for {}: {}", bot, e);
                    Vec::new()
                }
            }
        })
    }
}
