//! Trading signals evaluated bar by bar.

use market_data::models::bar::Bar;

/// Desired position change after seeing the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// A strategy sees the history up to and including the current bar and emits
/// a [`Signal`]. `history` is never empty and always ends at the bar being
/// evaluated.
pub trait Strategy {
    fn name(&self) -> &'static str;
    fn evaluate(&self, history: &[Bar]) -> Signal;
}

/// Buy on the first bar and never exit.
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn name(&self) -> &'static str {
        "buy-hold"
    }

    fn evaluate(&self, history: &[Bar]) -> Signal {
        if history.len() == 1 {
            Signal::Buy
        } else {
            Signal::Hold
        }
    }
}

/// Long when the fast simple moving average crosses above the slow one, flat
/// when it crosses back below.
pub struct SmaCross {
    fast: usize,
    slow: usize,
}

impl SmaCross {
    /// `fast` must be shorter than `slow`; both at least 1.
    pub fn new(fast: usize, slow: usize) -> anyhow::Result<Self> {
        if fast == 0 || slow == 0 || fast >= slow {
            anyhow::bail!("sma-cross needs 0 < fast < slow, got fast={fast} slow={slow}");
        }
        Ok(Self { fast, slow })
    }
}

impl Strategy for SmaCross {
    fn name(&self) -> &'static str {
        "sma-cross"
    }

    fn evaluate(&self, history: &[Bar]) -> Signal {
        // Need one extra bar to compare against yesterday's averages.
        if history.len() <= self.slow {
            return Signal::Hold;
        }
        let fast_now = sma(history, self.fast);
        let slow_now = sma(history, self.slow);
        let prev = &history[..history.len() - 1];
        let fast_prev = sma(prev, self.fast);
        let slow_prev = sma(prev, self.slow);

        if fast_prev <= slow_prev && fast_now > slow_now {
            Signal::Buy
        } else if fast_prev >= slow_prev && fast_now < slow_now {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

/// Mean close of the trailing `n` bars. Callers guarantee `history.len() >= n`.
fn sma(history: &[Bar], n: usize) -> f64 {
    let tail = &history[history.len() - n..];
    tail.iter().map(|b| b.close).sum::<f64>() / n as f64
}
