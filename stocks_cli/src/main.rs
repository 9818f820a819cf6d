//! `stocks` — download, plot and backtest cached market data.

mod backtest;
mod cli;
mod commands;
mod plot;
mod strategy;
mod tickers;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let cli = cli::Cli::parse();
    commands::run(cli).await
}
