//! Subcommand implementations.

use anyhow::Context;
use bar_cache::{
    datexpr::parse_date_expr,
    range::TimeRange,
    refresh::{RefreshOutcome, Refresher},
    store::BarStore,
    workspace::Workspace,
};
use chrono::Utc;
use market_data::{models::interval::Interval, providers::yahoo::YahooProvider};
use tracing::{info, warn};

use crate::{
    backtest::run_backtest,
    cli::{Cli, Commands, StrategyKind},
    plot,
    strategy::{BuyAndHold, SmaCross, Strategy},
    tickers,
};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Download {
            ticker,
            start,
            end,
            interval,
        } => cmd_download(&ticker, &start, &end, &interval).await,
        Commands::Plot {
            ticker,
            start,
            end,
            interval,
        } => cmd_plot(&ticker, &start, &end, &interval),
        Commands::Backtest {
            ticker,
            start,
            end,
            interval,
            strategy,
            fast,
            slow,
            cash,
        } => cmd_backtest(&ticker, &start, &end, &interval, strategy, fast, slow, cash).await,
    }
}

fn parse_window(start: &str, end: &str) -> anyhow::Result<TimeRange> {
    let now = Utc::now();
    Ok(TimeRange::new(
        parse_date_expr(start, now)?,
        parse_date_expr(end, now)?,
    ))
}

fn open_store(ws: &Workspace) -> anyhow::Result<BarStore> {
    ws.ensure_dirs()?;
    BarStore::open_path(&ws.db_path()).context("opening workspace database")
}

async fn cmd_download(
    ticker_arg: &str,
    start: &str,
    end: &str,
    interval: &str,
) -> anyhow::Result<()> {
    let interval: Interval = interval.parse()?;
    let window = parse_window(start, end)?;
    let symbols = tickers::resolve(ticker_arg)?;

    let ws = Workspace::from_env()?;
    let store = open_store(&ws)?;
    let provider = YahooProvider::new()?;
    let refresher = Refresher::new(&store, &provider);

    let mut failed = 0usize;
    for symbol in &symbols {
        let outcome = refresher.ensure_range(symbol, interval, window).await?;
        report_outcome(symbol, &outcome);
        if outcome.bars.is_empty() && !outcome.failures.is_empty() {
            failed += 1;
        } else {
            info!(ticker = %symbol, bars = outcome.bars.len(), "cache up to date");
        }
    }

    // Summary goes to stderr so stdout stays machine-parseable.
    eprintln!("SUMMARY: {} succeeded, {} failed", symbols.len() - failed, failed);
    if failed > 0 {
        anyhow::bail!("{failed} of {} tickers produced no data", symbols.len());
    }
    Ok(())
}

fn cmd_plot(ticker: &str, start: &str, end: &str, interval: &str) -> anyhow::Result<()> {
    let interval: Interval = interval.parse()?;
    let window = parse_window(start, end)?;
    let symbol = ticker.trim().to_uppercase();

    let ws = Workspace::from_env()?;
    let store = open_store(&ws)?;

    let bars = store.get_range(&symbol, interval, window)?;
    anyhow::ensure!(
        !bars.is_empty(),
        "no cached {interval} data for {symbol} in {window}; run download first"
    );

    let out = ws.plot_path(&symbol, interval.as_str());
    plot::render_close_chart(&symbol, &bars, &out)?;
    info!(bars = bars.len(), path = %out.display(), "plot written");
    println!("{}", out.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_backtest(
    ticker: &str,
    start: &str,
    end: &str,
    interval: &str,
    kind: StrategyKind,
    fast: usize,
    slow: usize,
    cash: f64,
) -> anyhow::Result<()> {
    anyhow::ensure!(cash > 0.0, "starting cash must be positive");
    let interval: Interval = interval.parse()?;
    let window = parse_window(start, end)?;
    let symbol = ticker.trim().to_uppercase();

    let strategy: Box<dyn Strategy> = match kind {
        StrategyKind::BuyHold => Box::new(BuyAndHold),
        StrategyKind::SmaCross => Box::new(SmaCross::new(fast, slow)?),
    };

    let ws = Workspace::from_env()?;
    let store = open_store(&ws)?;
    let provider = YahooProvider::new()?;
    let refresher = Refresher::new(&store, &provider);

    let outcome = refresher.ensure_range(&symbol, interval, window).await?;
    report_outcome(&symbol, &outcome);
    anyhow::ensure!(
        !outcome.bars.is_empty(),
        "no {interval} bars for {symbol} in the requested window"
    );

    let report = run_backtest(strategy.as_ref(), &outcome.bars, cash);
    println!(
        "{} on {symbol} ({} bars): {} trades, final equity {:.2}, return {:+.2}%",
        strategy.name(),
        outcome.bars.len(),
        report.trades,
        report.final_equity,
        report.return_pct,
    );
    Ok(())
}

fn report_outcome(symbol: &str, outcome: &RefreshOutcome) {
    if let Some(t) = &outcome.truncation {
        warn!(
            ticker = %symbol, requested = %t.requested_start, clamped = %t.clamped_start,
            "window truncated to the provider's lookback"
        );
    }
    for f in &outcome.failures {
        warn!(ticker = %symbol, range = %f.range, error = %f.error, "range could not be fetched");
    }
}
