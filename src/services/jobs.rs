//! Daily and weekly tournament jobs.

use crate::config::{Config, HISTORY_FILE, TRADE_LOG_FILE};
use crate::error::{AppError, Result};
use crate::services::alerting::{
    alert_drawdown, alert_low_win, drawdown_message, low_win_message, Notifier, TelegramNotifier,
};
use crate::services::analytics::{compute_balances, compute_metrics, strategy_breakdown};
use crate::services::helius::{HeliusClient, TradeSource};
use crate::services::publisher::MultiPlatformPublisher;
use crate::services::reports;
use crate::services::store::JsonStore;
use crate::services::trade_log::TradeLog;
use crate::types::{
    BalanceHistory, BlogPost, MetricsSnapshot, PeriodBalances, PublishResult, Trade,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Result of a daily run.
#[derive(Debug, Clone)]
pub struct DailyOutcome {
    pub day: u32,
    pub metrics: BTreeMap<String, MetricsSnapshot>,
    pub balances: PeriodBalances,
    pub new_trades: usize,
    /// Alert texts raised this run, whether or not delivery succeeded.
    pub alerts: Vec<String>,
    pub report_path: Option<PathBuf>,
    pub published: BTreeMap<String, PublishResult>,
}

/// Result of a weekly run.
#[derive(Debug, Clone)]
pub struct WeeklyOutcome {
    pub week: u32,
    pub end_day: u32,
    pub metrics: BTreeMap<String, MetricsSnapshot>,
    pub report_path: Option<PathBuf>,
    pub published: BTreeMap<String, PublishResult>,
}

/// Runs the tournament jobs against its collaborators.
pub struct Tournament {
    config: Config,
    store: JsonStore,
    source: Box<dyn TradeSource>,
    notifier: Box<dyn Notifier>,
    publisher: MultiPlatformPublisher,
}

impl Tournament {
    pub fn new(
        config: Config,
        source: Box<dyn TradeSource>,
        notifier: Box<dyn Notifier>,
        publisher: MultiPlatformPublisher,
    ) -> Self {
        let store = JsonStore::new(config.data_dir.clone());
        Self {
            config,
            store,
            source,
            notifier,
            publisher,
        }
    }

    /// Wire up the live Helius, Telegram and blog clients.
    pub fn from_config(config: Config) -> Self {
        let source = HeliusClient::new(config.helius_api_key.clone(), config.helius_base_url.clone());
        let notifier = TelegramNotifier::new(config.telegram_token.clone(), config.telegram_chat_id.clone());
        let publisher = MultiPlatformPublisher::from_config(&config);
        Self::new(config, Box::new(source), Box::new(notifier), publisher)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    pub fn publisher(&self) -> &MultiPlatformPublisher {
        &self.publisher
    }

    /// Tournament day of `date`; the start date is day 1.
    pub fn day_number(&self, date: NaiveDate) -> i64 {
        (date - self.config.start_date).num_days() + 1
    }

    fn checked_day(&self, day: i64) -> Result<u32> {
        u32::try_from(day)
            .ok()
            .filter(|d| *d >= 1)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "day {} is before the tournament start ({})",
                    day, self.config.start_date
                ))
            })
    }

    pub fn load_history(&self) -> BalanceHistory {
        self.store.load(HISTORY_FILE, BalanceHistory::new())
    }

    /// Fetch, score, checkpoint, report and publish one tournament day.
    pub async fn run_daily(&self, date: NaiveDate) -> Result<DailyOutcome> {
        let day = self.checked_day(self.day_number(date))?;
        info!("Running daily job for Day {} ({})", day, date);

        let mut log = TradeLog::load(&self.store);
        let mut history = self.load_history();

        let mut fetched = Vec::new();
        let mut metrics = BTreeMap::new();
        let mut strategies = BTreeMap::new();
        let mut alerts = Vec::new();

        for bot in &self.config.bots {
            info!("Processing {}...", bot.name);
            let since = log.last_timestamp(&bot.name);
            let new_trades: Vec<Trade> = self
                .source
                .fetch_trades(&bot.wallet, &bot.name, since)
                .await
                .into_iter()
                .filter(|t| !log.is_logged(t))
                .collect();

            let mut trades = log.for_bot(&bot.name);
            trades.extend(new_trades.iter().cloned());
            let snapshot = compute_metrics(&trades);
            strategies.insert(bot.name.clone(), strategy_breakdown(&trades));

            if snapshot.is_below_win_rate(self.config.win_rate_min) {
                alerts.push(low_win_message(&bot.name, snapshot.win_rate, day));
                if !alert_low_win(&*self.notifier, &bot.name, snapshot.win_rate, day).await {
                    warn!("Low win rate alert for {} was not delivered", bot.name);
                }
            }
            if snapshot.breaches_drawdown(self.config.max_drawdown_limit) {
                alerts.push(drawdown_message(&bot.name, snapshot.max_drawdown, day));
                if !alert_drawdown(&*self.notifier, &bot.name, snapshot.max_drawdown, day).await {
                    warn!("Drawdown alert for {} was not delivered", bot.name);
                }
            }

            metrics.insert(bot.name.clone(), snapshot);
            fetched.extend(new_trades);
        }

        let new_trades = fetched.len();
        log.extend(fetched);
        if !log.save(&self.store) {
            return Err(AppError::Persistence(format!(
                "failed to save {}",
                self.store.path(TRADE_LOG_FILE).display()
            )));
        }

        let balances = compute_balances(log.trades(), &self.config.bot_names(), self.config.initial_balance);
        history.record_period(day, balances.clone());
        if !self.store.save(HISTORY_FILE, &history) {
            return Err(AppError::Persistence(format!(
                "failed to save {}",
                self.store.path(HISTORY_FILE).display()
            )));
        }

        let content = reports::render_daily(day, &metrics, &balances, &strategies);
        let report_path = self.write_report(&reports::daily_file_name(day), &content);

        let post = BlogPost::new(reports::daily_title(day), content, tags(reports::DAILY_TAGS));
        let published = self.publish(&post).await;

        info!("Daily job completed for Day {}", day);
        Ok(DailyOutcome {
            day,
            metrics,
            balances,
            new_trades,
            alerts,
            report_path,
            published,
        })
    }

    /// Summarize the seven days ending at `end_day` (defaults to today's day).
    pub async fn run_weekly(&self, end_day: Option<u32>, today: NaiveDate) -> Result<WeeklyOutcome> {
        let end_day = match end_day {
            Some(day) => self.checked_day(i64::from(day))?,
            None => self.checked_day(self.day_number(today))?,
        };
        let week = reports::week_number(end_day);
        let week_start = end_day.saturating_sub(6).max(1);
        info!("Running weekly job for Week {} (Days {}-{})", week, week_start, end_day);

        let log = TradeLog::load(&self.store);
        let history = self.load_history();
        let weekly = TradeLog::new(log.in_day_range(
            self.config.start_date,
            i64::from(week_start),
            i64::from(end_day),
        ));

        let metrics: BTreeMap<String, MetricsSnapshot> = self
            .config
            .bots
            .iter()
            .map(|bot| (bot.name.clone(), compute_metrics(&weekly.for_bot(&bot.name))))
            .collect();

        let content = reports::render_weekly(week, end_day, weekly.len(), &metrics, &history);
        let report_path = self.write_report(&reports::weekly_file_name(week), &content);

        let post = BlogPost::new(reports::weekly_title(week), content, tags(reports::WEEKLY_TAGS));
        let published = self.publish(&post).await;

        info!("Weekly job completed ending on Day {}", end_day);
        Ok(WeeklyOutcome {
            week,
            end_day,
            metrics,
            report_path,
            published,
        })
    }

    fn write_report(&self, file_name: &str, content: &str) -> Option<PathBuf> {
        match reports::write_report(&self.config.blog_dir, file_name, content) {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Failed to write report {}: {}", file_name, e);
                None
            }
        }
    }

    async fn publish(&self, post: &BlogPost) -> BTreeMap<String, PublishResult> {
        let results = self.publisher.publish_to_all(post).await;
        if results.is_empty() {
            info!("No blog platforms configured for publishing");
            return results;
        }

        let succeeded: Vec<&str> = results
            .values()
            .filter(|r| r.success)
            .map(|r| r.platform.as_str())
            .collect();
        if succeeded.is_empty() {
            warn!("Failed to publish \"{}\" to any blog platform", post.title);
        } else {
            info!("Published \"{}\" to: {}", post.title, succeeded.join(", "));
        }
        results
    }
}

fn tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BotConfig;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    struct NoTrades;

    impl TradeSource for NoTrades {
        fn fetch_trades<'a>(
            &'a self,
            _wallet: &'a str,
            _bot: &'a str,
            _since: Option<i64>,
        ) -> Pin<Box<dyn Future<Output = Vec<Trade>> + Send + 'a>> {
            Box::pin(async { Vec::new() })
        }
    }

    #[derive(Clone, Default)]
    struct Silent(Arc<Mutex<usize>>);

    impl Notifier for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn is_configured(&self) -> bool {
            true
        }

        fn send<'a>(&'a self, _message: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
            Box::pin(async move {
                if let Ok(mut count) = self.0.lock() {
                    *count += 1;
                }
                true
            })
        }
    }

    fn tournament(name: &str) -> (Tournament, PathBuf) {
        let dir = std::env::temp_dir().join(format!("tourney_jobs_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        let config = Config {
            bots: vec![BotConfig::new("Trojan", "wallet")],
            data_dir: dir.clone(),
            blog_dir: dir.join("blog_posts"),
            ..Config::default()
        };
        let t = Tournament::new(
            config,
            Box::new(NoTrades),
            Box::new(Silent::default()),
            MultiPlatformPublisher::new(Vec::new()),
        );
        (t, dir)
    }

    #[test]
    fn test_day_number() {
        let (t, _) = tournament("day_number");
        let start = t.config().start_date;
        assert_eq!(t.day_number(start), 1);
        assert_eq!(t.day_number(start + chrono::Duration::days(13)), 14);
        assert_eq!(t.day_number(start - chrono::Duration::days(1)), 0);
    }

    #[tokio::test]
    async fn test_run_daily_before_start_is_rejected() {
        let (t, dir) = tournament("before_start");
        let date = t.config().start_date - chrono::Duration::days(3);

        let result = t.run_daily(date).await;

        assert!(matches!(result, Err(AppError::Config(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_run_daily_without_trades() {
        let (t, dir) = tournament("no_trades");
        let date = t.config().start_date;

        let outcome = t.run_daily(date).await.unwrap();

        assert_eq!(outcome.day, 1);
        assert_eq!(outcome.new_trades, 0);
        assert_eq!(outcome.balances.get("Trojan"), Some(&50.0));
        // Zero trades means a zero win rate, which is below the minimum
        assert_eq!(outcome.alerts.len(), 1);
        assert!(outcome.published.is_empty());
        assert!(outcome.report_path.unwrap().ends_with("day_1_report.md"));
        assert_eq!(t.load_history().get(1).and_then(|b| b.get("Trojan")), Some(&50.0));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_run_weekly_defaults_to_today() {
        let (t, dir) = tournament("weekly_today");
        let today = t.config().start_date + chrono::Duration::days(13);

        let outcome = t.run_weekly(None, today).await.unwrap();

        assert_eq!(outcome.end_day, 14);
        assert_eq!(outcome.week, 3);
        assert!(outcome.report_path.unwrap().ends_with("week_3_summary.md"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_run_weekly_rejects_day_zero() {
        let (t, dir) = tournament("weekly_zero");
        let today = t.config().start_date;

        assert!(t.run_weekly(Some(0), today).await.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
