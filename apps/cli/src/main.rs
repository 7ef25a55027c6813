//! MarketRoute CLI - classify codes, inspect routing and fetch data.
//!
//! Commands:
//! - `classify` - market, currency, timezone and trading status per code
//! - `plan` - provider order for a code's market
//! - `daily` - canonical daily history as JSON, with its source
//! - `quote` - realtime quote as JSON, or `null`

mod config;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use marketroute_market_data::{
    canonical_code, classify, is_valid_code_format, DailyRequest, MarketDataEngine,
    MarketDataProvider, OperationKind, ProviderRegistry, SyntheticProvider,
};
use serde_json::json;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;

#[derive(Parser)]
#[command(
    name = "marketroute",
    about = "MarketRoute CLI - multi-market equity data routing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify stock codes into markets.
    Classify {
        /// Codes to classify (e.g., 600519 00700 AAPL VOD.L).
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Show the provider order used for a code.
    Plan {
        code: String,

        /// Show the realtime plan instead of the daily one.
        #[arg(long, default_value_t = false)]
        realtime: bool,
    },
    /// Fetch daily history.
    Daily {
        code: String,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,

        /// Number of most recent rows. Defaults to 30.
        #[arg(long)]
        days: Option<u32>,
    },
    /// Fetch a realtime quote.
    Quote { code: String },
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn build_engine(config: &Config) -> Result<MarketDataEngine> {
    let providers: Vec<Arc<dyn MarketDataProvider>> = vec![Arc::new(SyntheticProvider::new())];
    let registry = ProviderRegistry::with_providers(providers)?;
    tracing::info!("Registered providers: {:?}", registry.ids());
    Ok(MarketDataEngine::new(
        Arc::new(registry),
        config.engine_config(),
    ))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    init_tracing(&config.log_format);
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { codes } => {
            let now = Utc::now();
            let rows: Vec<_> = codes
                .iter()
                .map(|code| {
                    let market = classify(code);
                    json!({
                        "code": code,
                        "market": market,
                        "name": market.display_name(),
                        "currency": market.currency(),
                        "timezone": market.timezone().name(),
                        "region": market.region(),
                        "canonical": canonical_code(code, Some(market)),
                        "valid_format": is_valid_code_format(&code.trim().to_uppercase(), market),
                        "trading_now": market.is_trading_hours(now),
                    })
                })
                .collect();
            print_json(&rows)
        }
        Commands::Plan { code, realtime } => {
            let engine = build_engine(&config)?;
            let kind = if realtime {
                OperationKind::Realtime
            } else {
                OperationKind::Daily
            };
            let plan = engine.plan(kind, &code);
            print_json(&json!({
                "code": code,
                "market": plan.market,
                "kind": plan.kind,
                "providers": plan.names(),
            }))
        }
        Commands::Daily {
            code,
            start,
            end,
            days,
        } => {
            let engine = build_engine(&config)?;
            let request = DailyRequest::parse(&code, start.as_deref(), end.as_deref(), days)?;
            let (table, source) = engine.get_daily_data(request).await?;
            print_json(&json!({
                "source": source,
                "data": table.as_ref(),
            }))
        }
        Commands::Quote { code } => {
            let engine = build_engine(&config)?;
            match engine.get_realtime_quote_with_source(&code).await? {
                Some((quote, source)) => print_json(&json!({
                    "source": source,
                    "quote": quote.as_ref(),
                })),
                None => print_json(&serde_json::Value::Null),
            }
        }
    }
}
