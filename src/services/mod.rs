pub mod alerting;
pub mod analytics;
pub mod helius;
pub mod jobs;
pub mod publisher;
pub mod reports;
pub mod store;
pub mod trade_log;

pub use alerting::{Notifier, TelegramNotifier};
pub use analytics::{classify_strategy, compute_balances, compute_metrics, strategy_breakdown};
pub use helius::{HeliusClient, TradeSource};
pub use jobs::{DailyOutcome, Tournament, WeeklyOutcome};
pub use publisher::{
    DevToPublisher, GhostPublisher, HashnodePublisher, MediumPublisher, MultiPlatformPublisher,
    Publisher,
};
pub use store::JsonStore;
pub use trade_log::{day_index, TradeLog};
