use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tourney::config::Config;
use tourney::services::reports::format_number;
use tourney::services::Tournament;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Solana trading bot tournament tracker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch trades, update balances and publish the daily report
    Daily {
        /// Tournament date to run for (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Publish the summary of the seven days ending at a tournament day
    Weekly {
        /// Last day of the week, defaults to today's tournament day
        #[arg(long)]
        day: Option<u32>,
    },
    /// Show which wallets, sinks and blog platforms are configured
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourney=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    for warning in config.validate() {
        warn!("{}", warning);
    }

    let today = Local::now().date_naive();
    let tournament = Tournament::from_config(config);

    match args.command {
        Command::Daily { date } => {
            let outcome = tournament.run_daily(date.unwrap_or(today)).await?;
            info!(
                "Day {}: {} new trades, {} alerts",
                outcome.day,
                outcome.new_trades,
                outcome.alerts.len()
            );
        }
        Command::Weekly { day } => {
            let outcome = tournament.run_weekly(day, today).await?;
            info!("Week {} summary written (ending Day {})", outcome.week, outcome.end_day);
        }
        Command::Status => print_status(&tournament, today),
    }

    Ok(())
}

fn print_status(tournament: &Tournament, today: NaiveDate) {
    let config = tournament.config();

    println!("Tournament start: {} (today is Day {})", config.start_date, tournament.day_number(today));
    println!("Data directory:   {}", config.data_dir.display());
    println!("Blog directory:   {}", config.blog_dir.display());

    match tournament.load_history().latest() {
        Some((day, balances)) => {
            println!("\nLatest checkpoint (Day {}):", day);
            for (bot, balance) in balances {
                println!("  {:<10} {} SOL", bot, format_number(*balance));
            }
        }
        None => println!("\nNo balance checkpoints recorded yet."),
    }

    println!("\nWallets:");
    for bot in &config.bots {
        let state = if bot.has_wallet() { bot.wallet.as_str() } else { "not configured" };
        println!("  {:<10} {}", bot.name, state);
    }

    let mark = |ok: bool| if ok { "configured" } else { "not configured" };
    println!("\nSinks:");
    println!("  {:<10} {}", "Helius", mark(config.helius_api_key.is_some()));
    println!(
        "  {:<10} {}",
        "Telegram",
        mark(config.telegram_token.is_some() && config.telegram_chat_id.is_some())
    );

    println!("\nBlog platforms:");
    for (platform, configured) in tournament.publisher().status() {
        println!("  {:<10} {}", platform, mark(configured));
    }
}
