use analyzer::{AnalysisResponse, Analyzer};
use anyhow::Context;
use api_client::{InMemorySource, MarketDataSource, YahooClient};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{init_tracing, load_config, Config, LogFormat};
use core_types::MarketSnapshot;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The main entry point for the portfolio analyzer.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load PORTFOLIO__* overrides from a .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    let _log_guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Analyze(args) => handle_analyze(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Values a stock portfolio against live market data.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to ./config.toml when it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Console log style, overriding `logging.format`.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (POST /api/analyze-portfolio).
    Serve(ServeArgs),
    /// Analyze a portfolio file once and print a summary.
    Analyze(AnalyzeArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to bind, overriding `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overriding `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// A JSON file shaped like the API request body: {"portfolio": [...]}.
    #[arg(long)]
    input: PathBuf,

    /// A JSON map of symbol to snapshot. When given, no network calls are made.
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Where to write the full JSON response.
    #[arg(long)]
    output: Option<PathBuf>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;
    web_server::run_server(&config).await
}

async fn handle_analyze(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let payload: Value = read_json(&args.input)?;

    let source: Arc<dyn MarketDataSource> = match &args.snapshots {
        Some(path) => {
            let snapshots: HashMap<String, MarketSnapshot> = read_json(path)?;
            tracing::info!(symbols = snapshots.len(), "Using offline snapshots.");
            Arc::new(InMemorySource::new(snapshots))
        }
        None => Arc::new(YahooClient::new(&config.market_data)?),
    };

    let analyzer = Analyzer::new(source, config.market_data.max_concurrent_fetches);
    let response = analyzer.run(&payload).await?;

    println!("{}", summary_table(&response));

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&response)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Full response written to {}", path.display());
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn summary_table(response: &AnalysisResponse) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![
            "Symbol", "Price", "Invested", "Value", "Gain/Loss", "Return %", "Note",
        ]);

    for (symbol, result) in &response.stock_data {
        table.add_row(vec![
            symbol.clone(),
            result.current_price.map(money).unwrap_or_else(|| "-".to_string()),
            money(result.invested_amount),
            money(result.current_value),
            money(result.gain_loss),
            money(result.return_percent),
            result.error.clone().unwrap_or_default(),
        ]);
    }
    table
}

fn money(value: Decimal) -> String {
    value.round_dp(2).to_string()
}
