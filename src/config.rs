use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;

/// Default tournament start date.
pub const DEFAULT_START_DATE: (i32, u32, u32) = (2025, 7, 14);
/// Trade log file key inside the data directory.
pub const TRADE_LOG_FILE: &str = "trade_log.json";
/// Balance history file key inside the data directory.
pub const HISTORY_FILE: &str = "balance_history.json";

/// Default bots: (name, wallet env var).
const DEFAULT_BOTS: &[(&str, &str)] = &[
    ("Trojan", "TROJAN_WALLET_ADDRESS"),
    ("TradeWiz", "TRADEWIZ_WALLET_ADDRESS"),
    ("FrogBot", "FROGBOT_WALLET_ADDRESS"),
];

/// A competing bot and the wallet its trades are read from.
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    /// Bot name, used as the agent tag on trades.
    pub name: String,
    /// Wallet address, or a `<PLACEHOLDER>` when not configured.
    pub wallet: String,
}

impl BotConfig {
    pub fn new(name: impl Into<String>, wallet: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wallet: wallet.into(),
        }
    }

    /// Whether a real wallet address is set.
    pub fn has_wallet(&self) -> bool {
        is_wallet_configured(&self.wallet)
    }
}

/// Whether a wallet address is usable (non-empty and not a placeholder).
pub fn is_wallet_configured(wallet: &str) -> bool {
    let wallet = wallet.trim();
    !wallet.is_empty() && !wallet.starts_with('<')
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Competing bots.
    pub bots: Vec<BotConfig>,
    /// Day 1 of the tournament.
    pub start_date: NaiveDate,
    /// Starting balance of every bot, in SOL.
    pub initial_balance: f64,
    /// Alert when a bot's win rate drops under this percentage.
    pub win_rate_min: f64,
    /// Alert when a bot's max drawdown goes below this (negative) value.
    pub max_drawdown_limit: f64,
    /// Directory holding the trade log and balance history.
    pub data_dir: PathBuf,
    /// Directory rendered reports are written to.
    pub blog_dir: PathBuf,
    /// Helius API key for enhanced transactions.
    pub helius_api_key: Option<String>,
    /// Helius API base URL.
    pub helius_base_url: String,
    /// Telegram bot token.
    pub telegram_token: Option<String>,
    /// Telegram chat to post alerts to.
    pub telegram_chat_id: Option<String>,
    /// Medium integration token.
    pub medium_access_token: Option<String>,
    /// Dev.to API key.
    pub devto_api_key: Option<String>,
    /// Hashnode personal access token.
    pub hashnode_access_token: Option<String>,
    /// Hashnode publication to post into.
    pub hashnode_publication_id: Option<String>,
    /// Ghost site URL, e.g. `https://blog.example.com`.
    pub ghost_api_url: Option<String>,
    /// Ghost Admin API key in `id:hexsecret` form.
    pub ghost_admin_api_key: Option<String>,
}

/// Read a variable, treating blank values as unset.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bots = DEFAULT_BOTS
            .iter()
            .map(|(name, var)| {
                let wallet = non_empty_var(var).unwrap_or_else(|| format!("<{}>", var));
                BotConfig::new(*name, wallet)
            })
            .collect();

        Self {
            bots,
            start_date: non_empty_var("START_DATE")
                .and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
                .unwrap_or(defaults.start_date),
            initial_balance: non_empty_var("INITIAL_BALANCE_SOL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.initial_balance),
            win_rate_min: non_empty_var("WIN_RATE_MIN")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.win_rate_min),
            max_drawdown_limit: non_empty_var("MAX_DRAWDOWN_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_drawdown_limit),
            data_dir: non_empty_var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            blog_dir: non_empty_var("BLOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.blog_dir),
            helius_api_key: non_empty_var("HELIUS_API_KEY"),
            helius_base_url: non_empty_var("HELIUS_BASE_URL").unwrap_or(defaults.helius_base_url),
            telegram_token: non_empty_var("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: non_empty_var("TELEGRAM_CHAT_ID"),
            medium_access_token: non_empty_var("MEDIUM_ACCESS_TOKEN"),
            devto_api_key: non_empty_var("DEVTO_API_KEY"),
            hashnode_access_token: non_empty_var("HASHNODE_ACCESS_TOKEN"),
            hashnode_publication_id: non_empty_var("HASHNODE_PUBLICATION_ID"),
            ghost_api_url: non_empty_var("GHOST_API_URL"),
            ghost_admin_api_key: non_empty_var("GHOST_ADMIN_API_KEY"),
        }
    }

    /// Configuration problems worth logging at startup. None of them are fatal.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.helius_api_key.is_none() {
            warnings.push("HELIUS_API_KEY not set - trade fetching is disabled".to_string());
        }

        if self.telegram_token.is_some() != self.telegram_chat_id.is_some() {
            warnings.push(
                "Incomplete Telegram configuration - missing token or chat ID".to_string(),
            );
        }

        if self.hashnode_access_token.is_some() != self.hashnode_publication_id.is_some() {
            warnings.push(
                "Incomplete Hashnode configuration - missing token or publication ID".to_string(),
            );
        }

        if self.ghost_api_url.is_some() != self.ghost_admin_api_key.is_some() {
            warnings.push("Incomplete Ghost configuration - missing URL or admin API key".to_string());
        } else if let Some(key) = &self.ghost_admin_api_key {
            if key.split_once(':').is_none() {
                warnings.push("GHOST_ADMIN_API_KEY must have the form id:secret".to_string());
            }
        }

        let missing: Vec<&str> = self
            .bots
            .iter()
            .filter(|b| !b.has_wallet())
            .map(|b| b.name.as_str())
            .collect();
        if missing.len() == self.bots.len() {
            warnings.push("No bot wallet addresses configured".to_string());
        } else if !missing.is_empty() {
            warnings.push(format!("Missing wallet addresses for: {}", missing.join(", ")));
        }

        if self.max_drawdown_limit > 0.0 {
            warnings.push(format!(
                "MAX_DRAWDOWN_LIMIT is positive ({}) - drawdowns are never positive, every bot will alert",
                self.max_drawdown_limit
            ));
        }

        warnings
    }

    /// Names of all configured bots.
    pub fn bot_names(&self) -> Vec<String> {
        self.bots.iter().map(|b| b.name.clone()).collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        let (year, month, day) = DEFAULT_START_DATE;
        Self {
            bots: DEFAULT_BOTS
                .iter()
                .map(|(name, var)| BotConfig::new(*name, format!("<{}>", var)))
                .collect(),
            start_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
            initial_balance: 50.0,
            win_rate_min: 55.0,
            max_drawdown_limit: -5.0,
            data_dir: PathBuf::from("."),
            blog_dir: PathBuf::from("blog_posts"),
            helius_api_key: None,
            helius_base_url: "https://api.helius.xyz/v0".to_string(),
            telegram_token: None,
            telegram_chat_id: None,
            medium_access_token: None,
            devto_api_key: None,
            hashnode_access_token: None,
            hashnode_publication_id: None,
            ghost_api_url: None,
            ghost_admin_api_key: None,
        }
    }
}
