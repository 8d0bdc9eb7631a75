use anyhow::Result;
use clap::Parser;
use sidekick::commands::{
    self,
    config::{Config, ConfigOverrides},
    services::{build_explainer, build_market},
};
use sidekick::market::Timeframe;
use sidekick::runtime::RealRuntime;
use std::path::PathBuf;
use std::time::Duration;

/// sidekick - developer sidekick
///
/// Explain code snippets with an AI model and keep an eye on crypto markets.
///
/// The explainer needs a Gemini API key, read from GEMINI_API_KEY or --api-key.
/// Portfolio holdings and price alerts are read from the data directory.
///
/// Examples:
///   sidekick explain src/main.rs     # Explain a file
///   cat snippet.py | sidekick explain
///   sidekick serve --listen 0.0.0.0:3000
///   sidekick markets --filter btc
///   sidekick alerts --check --watch  # Re-check every minute
#[derive(Parser, Debug)]
#[command(author, version = env!("SIDEKICK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory for holdings and alerts (defaults to ~/.sidekick)
    #[arg(
        long = "data-dir",
        env = "SIDEKICK_HOME",
        value_name = "PATH",
        global = true
    )]
    pub data_dir: Option<PathBuf>,

    /// Gemini API key
    #[arg(long = "api-key", env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Gemini model (defaults to gemini-2.5-flash)
    #[arg(long, env = "GEMINI_MODEL", global = true)]
    pub model: Option<String>,

    /// Gemini API URL (defaults to https://generativelanguage.googleapis.com)
    #[arg(long = "gemini-url", value_name = "URL", global = true)]
    pub gemini_url: Option<String>,

    /// Market data API URL (defaults to https://api.coingecko.com/api/v3)
    #[arg(long = "market-url", value_name = "URL", global = true)]
    pub market_url: Option<String>,

    /// Explainer attempts per request, the first one included (defaults to 3)
    #[arg(long = "max-retries", value_name = "N", global = true)]
    pub max_retries: Option<usize>,

    /// Explainer backoff unit in milliseconds; retry n waits unit * 2^(n+1) (defaults to 1000)
    #[arg(long = "base-delay-ms", value_name = "MS", global = true)]
    pub base_delay_ms: Option<u64>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            data_dir: self.data_dir.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            gemini_url: self.gemini_url.clone(),
            market_url: self.market_url.clone(),
            max_retries: self.max_retries,
            base_delay_ms: self.base_delay_ms,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Explain a code snippet
    Explain(ExplainArgs),

    /// List cryptocurrencies by market cap
    Markets(MarketsArgs),

    /// Show details for one cryptocurrency
    Coin(CoinArgs),

    /// Show the price history of a cryptocurrency
    Chart(ChartArgs),

    /// Search cryptocurrencies by name or symbol
    Search(SearchArgs),

    /// Value the saved portfolio at current prices
    Portfolio,

    /// List price alerts
    Alerts(AlertsArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:3000")]
    pub listen: String,
}

#[derive(clap::Args, Debug)]
pub struct ExplainArgs {
    /// File to explain; reads stdin when omitted
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Language of the snippet (detected when omitted)
    #[arg(long, short = 'l')]
    pub language: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct MarketsArgs {
    /// Number of assets per page
    #[arg(long, default_value_t = 100)]
    pub limit: u32,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Only show assets whose name or symbol contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Refresh every SECS seconds (60 when no value is given) until interrupted
    #[arg(
        long,
        value_name = "SECS",
        num_args = 0..=1,
        default_missing_value = "60",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub watch: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct CoinArgs {
    /// Asset id, e.g. "bitcoin"
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ChartArgs {
    /// Asset id, e.g. "bitcoin"
    #[arg(value_name = "ID")]
    pub id: String,

    /// Window in days: 1, 7, 30 or 365
    #[arg(long, default_value = "7")]
    pub days: Timeframe,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    #[arg(value_name = "QUERY")]
    pub query: String,
}

#[derive(clap::Args, Debug)]
pub struct AlertsArgs {
    /// Check active alerts against current prices and save the ones that fire
    #[arg(long)]
    pub check: bool,

    /// With --check, check again every SECS seconds (60 when no value is given)
    #[arg(
        long,
        value_name = "SECS",
        num_args = 0..=1,
        default_missing_value = "60",
        requires = "check",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub watch: Option<u64>,
}

fn utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn print_refresh(output: String) {
    println!("--- {} ---", utc_now());
    print!("{}", output);
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;
    let config = Config::load(&runtime, cli.overrides())?;

    let output = match cli.command {
        Commands::Serve(args) => {
            let explainer = build_explainer(&config)?;
            sidekick::server::serve(explainer, &args.listen).await?;
            return Ok(());
        }
        Commands::Explain(args) => {
            let explainer = build_explainer(&config)?;
            let mut explanation = commands::explain(
                &runtime,
                &explainer,
                args.file.as_deref(),
                args.language.as_deref(),
            )
            .await?;
            explanation.push('\n');
            explanation
        }
        Commands::Markets(args) => {
            let market = build_market(&config)?;
            if let Some(secs) = args.watch {
                commands::watch_markets(
                    &market,
                    args.limit,
                    args.page,
                    args.filter.as_deref(),
                    Duration::from_secs(secs),
                    None,
                    print_refresh,
                )
                .await;
                return Ok(());
            }
            commands::markets(&market, args.limit, args.page, args.filter.as_deref()).await?
        }
        Commands::Coin(args) => commands::coin(&build_market(&config)?, &args.id).await?,
        Commands::Chart(args) => {
            commands::chart(&build_market(&config)?, &args.id, args.days).await?
        }
        Commands::Search(args) => commands::search(&build_market(&config)?, &args.query).await?,
        Commands::Portfolio => {
            let market = build_market(&config)?;
            commands::portfolio(&runtime, &market, &config.data_dir).await?
        }
        Commands::Alerts(args) => {
            let market = build_market(&config)?;
            if let Some(secs) = args.watch {
                commands::watch_alerts(
                    &runtime,
                    &market,
                    &config.data_dir,
                    Duration::from_secs(secs),
                    None,
                    utc_now,
                    print_refresh,
                )
                .await;
                return Ok(());
            }
            commands::alerts(&runtime, &market, &config.data_dir, args.check, &utc_now()).await?
        }
    };

    print!("{}", output);
    Ok(())
}
