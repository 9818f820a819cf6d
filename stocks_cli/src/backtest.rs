//! Minimal long-only backtest: fills at the close of the signal bar.

use market_data::models::bar::Bar;

use crate::strategy::{Signal, Strategy};

#[derive(Debug)]
pub struct BacktestReport {
    /// Executed orders (a round trip counts as two).
    pub trades: u32,
    /// Cash plus any open position marked at the last close.
    pub final_equity: f64,
    /// Percent return on the starting cash.
    pub return_pct: f64,
}

/// Walk the bars in order, feeding the strategy a growing history. Buys go
/// all-in (fractional shares), sells liquidate; signals that do not change
/// the position are ignored.
pub fn run_backtest(strategy: &dyn Strategy, bars: &[Bar], initial_cash: f64) -> BacktestReport {
    let mut cash = initial_cash;
    let mut shares = 0.0_f64;
    let mut trades = 0;

    for i in 0..bars.len() {
        let price = bars[i].close;
        match strategy.evaluate(&bars[..=i]) {
            Signal::Buy if shares == 0.0 && price > 0.0 => {
                shares = cash / price;
                cash = 0.0;
                trades += 1;
            }
            Signal::Sell if shares > 0.0 => {
                cash += shares * price;
                shares = 0.0;
                trades += 1;
            }
            _ => {}
        }
    }

    let final_equity = cash + shares * bars.last().map_or(0.0, |b| b.close);
    let return_pct = if initial_cash > 0.0 {
        (final_equity - initial_cash) / initial_cash * 100.0
    } else {
        0.0
    };
    BacktestReport {
        trades,
        final_equity,
        return_pct,
    }
}
