//! On-disk workspace layout.
//!
//! Everything the tool persists lives under a single directory: the SQLite
//! database and any rendered plots. The location comes from the `STOCKS_WS`
//! environment variable, falling back to `$HOME/stocks_ws`.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Environment variable that overrides the workspace root.
pub const WORKSPACE_ENV: &str = "STOCKS_WS";

/// Root directory holding the database and plot output.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Resolve the workspace from `STOCKS_WS`, else `$HOME/stocks_ws`.
    pub fn from_env() -> anyhow::Result<Self> {
        if let Ok(dir) = std::env::var(WORKSPACE_ENV) {
            return Ok(Self::at(dir));
        }
        let home = std::env::var("HOME")
            .with_context(|| format!("neither {WORKSPACE_ENV} nor HOME is set"))?;
        Ok(Self::at(Path::new(&home).join("stocks_ws")))
    }

    /// Use an explicit root directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the SQLite database file.
    pub fn db_path(&self) -> PathBuf {
        self.root.join("stocks.db")
    }

    /// Directory rendered plots are written to.
    pub fn plots_dir(&self) -> PathBuf {
        self.root.join("plots")
    }

    /// Output path for a ticker/interval plot.
    pub fn plot_path(&self, ticker: &str, interval: &str) -> PathBuf {
        self.plots_dir().join(format!("{ticker}_{interval}.html"))
    }

    /// Create the root and plots directories if absent.
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(self.plots_dir())
            .with_context(|| format!("creating workspace at {}", self.root.display()))?;
        Ok(())
    }
}
