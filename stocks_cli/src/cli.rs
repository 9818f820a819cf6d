use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about = "Download, plot and backtest stock data from a local cache")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch missing bars from Yahoo into the local cache
    Download {
        /// Ticker(s): comma-separated list, CSV file with a Symbol column,
        /// or a directory of such CSV files
        #[arg(short, long)]
        ticker: String,

        /// Start date: now, _N[dmy], +N[dmy] or YYYY-MM-DD
        #[arg(short, long, default_value = "_6d")]
        start: String,

        /// End date, same forms as --start
        #[arg(short, long, default_value = "+1d")]
        end: String,

        /// Bar interval: 1m, 2m, 5m, 15m, 30m, 1h (60m) or 1d
        #[arg(short, long, default_value = "1d")]
        interval: String,
    },

    /// Render a close-price chart from cached bars (no network)
    Plot {
        /// Single ticker symbol
        #[arg(short, long)]
        ticker: String,

        /// Start date
        #[arg(short, long)]
        start: String,

        /// End date
        #[arg(short, long)]
        end: String,

        /// Bar interval
        #[arg(short, long, default_value = "1d")]
        interval: String,
    },

    /// Refresh a window and run a strategy over it
    Backtest {
        /// Single ticker symbol
        #[arg(short, long)]
        ticker: String,

        /// Start date
        #[arg(short, long, default_value = "_1y")]
        start: String,

        /// End date
        #[arg(short, long, default_value = "+1d")]
        end: String,

        /// Bar interval
        #[arg(short, long, default_value = "1d")]
        interval: String,

        /// Strategy to evaluate
        #[arg(long, value_enum, default_value_t = StrategyKind::BuyHold)]
        strategy: StrategyKind,

        /// Fast moving-average window (sma-cross)
        #[arg(long, default_value_t = 10)]
        fast: usize,

        /// Slow moving-average window (sma-cross)
        #[arg(long, default_value_t = 30)]
        slow: usize,

        /// Starting cash
        #[arg(long, default_value_t = 10_000.0)]
        cash: f64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyKind {
    /// Buy on the first bar, never sell
    BuyHold,
    /// Go long/flat on fast/slow moving-average crossovers
    SmaCross,
}
