//! One-shot analysis: load bars for a symbol, run the pipeline once and
//! print the signal panel (or the JSON report).

use anyhow::{Context, Result};
use clap::Parser;
use engine::analysis::run_analysis;
use engine::config::EngineSettings;
use engine::data::market_data::{BarSource, CsvBarSource};
use engine::signals::REWARD_TO_RISK;
use serde::Serialize;
use shared::models::{AnalyzedCandle, MarketSnapshot, Signal, SignalKind, TimeFrame};
use shared::utils::{format_optional, format_price, format_signed};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "analyze", about = "Trend + RSI pullback signal for the latest bar")]
struct Cli {
    /// JSON settings file. Falls back to $SNIPER_CONFIG, then defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding <symbol>_<timeframe>.csv exports.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Instrument symbol. Defaults to the configured symbol.
    #[arg(long)]
    symbol: Option<String>,

    /// Sampling interval: 1h or 1d.
    #[arg(long, default_value = "1h")]
    timeframe: TimeFrame,

    /// Stop distance in price units. Defaults to the timeframe's configured value.
    #[arg(long)]
    risk_distance: Option<f64>,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    symbol: &'a str,
    timeframe: TimeFrame,
    snapshot: &'a MarketSnapshot,
    signal: &'a Signal,
    chart: &'a [AnalyzedCandle],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let mut settings = EngineSettings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    let symbol = cli.symbol.unwrap_or_else(|| settings.symbol.clone());
    let risk_distance = cli
        .risk_distance
        .unwrap_or(settings.timeframe(cli.timeframe).risk_distance);

    let source = CsvBarSource::from_settings(&settings);
    let bars = source
        .fetch_bars(&symbol, cli.timeframe)
        .with_context(|| format!("Could not load {} bars for {}", cli.timeframe, symbol))?;
    let report = run_analysis(&bars, risk_distance)
        .with_context(|| format!("Analysis of {} ({}) did not produce a signal", symbol, cli.timeframe))?;

    if cli.json {
        let json = JsonReport {
            symbol: &symbol,
            timeframe: cli.timeframe,
            snapshot: &report.snapshot,
            signal: &report.signal,
            chart: report.chart(settings.chart_window),
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    print_panel(&symbol, cli.timeframe, &report.snapshot, &report.signal);
    Ok(())
}

fn print_panel(symbol: &str, timeframe: TimeFrame, snapshot: &MarketSnapshot, signal: &Signal) {
    println!("{} ({}) at {}", symbol, timeframe, snapshot.timestamp.format("%Y-%m-%d %H:%M UTC"));
    println!(
        "  Price   {} ({})",
        format_price(snapshot.last_close),
        format_signed(snapshot.price_change)
    );
    println!(
        "  RSI(14) {:.2} ({})",
        snapshot.rsi,
        snapshot.rsi_change.map_or_else(|| "-".to_string(), format_signed)
    );
    println!("  Trend   {}", snapshot.trend);
    println!("  Reason  {}", signal.reason);
    println!();

    if !signal.kind.is_actionable() {
        match signal.kind {
            SignalKind::Warning => println!("SIGNAL: WARNING, no entry"),
            _ => println!("SIGNAL: NONE (WAIT)"),
        }
        return;
    }

    let label = if signal.kind == SignalKind::Buy { "STRONG BUY" } else { "STRONG SELL" };
    println!("SIGNAL: {}", label);
    println!("  Entry        {}", format_optional(signal.entry));
    println!(
        "  Stop loss    {} (risk {})",
        format_optional(signal.stop_loss),
        format_price(snapshot.risk_distance)
    );
    println!(
        "  Take profit  {} (reward {}, 1:{})",
        format_optional(signal.take_profit),
        format_price(snapshot.risk_distance * REWARD_TO_RISK),
        REWARD_TO_RISK
    );
}
