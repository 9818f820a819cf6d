//! Resolving the `--ticker` argument into a symbol list.
//!
//! Accepted forms, tried in order: a directory (every `*.csv` inside is
//! read), a single CSV file, or a comma-separated list. CSV files must carry
//! a `Symbol` column. Symbols are upper-cased and de-duplicated, keeping
//! first-seen order.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use tracing::info;

pub fn resolve(arg: &str) -> anyhow::Result<Vec<String>> {
    let path = Path::new(arg);
    let raw = if path.is_dir() {
        let mut symbols = Vec::new();
        for entry in std::fs::read_dir(path)
            .with_context(|| format!("reading ticker directory {}", path.display()))?
        {
            let file = entry?.path();
            if file.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) {
                symbols.extend(symbols_from_csv(&file)?);
            }
        }
        info!(count = symbols.len(), dir = %path.display(), "collected tickers from directory");
        symbols
    } else if path.is_file() {
        let symbols = symbols_from_csv(path)?;
        info!(count = symbols.len(), file = %path.display(), "loaded tickers from file");
        symbols
    } else {
        arg.split(',').map(str::to_string).collect()
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for s in raw {
        let symbol = s.trim().to_uppercase();
        if !symbol.is_empty() && seen.insert(symbol.clone()) {
            out.push(symbol);
        }
    }
    if out.is_empty() {
        anyhow::bail!("no ticker symbols in {arg:?}");
    }
    Ok(out)
}

fn symbols_from_csv(path: &Path) -> anyhow::Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening ticker file {}", path.display()))?;

    let idx = reader
        .headers()?
        .iter()
        .position(|h| h.eq_ignore_ascii_case("symbol"))
        .with_context(|| format!("{} has no Symbol column", path.display()))?;

    let mut symbols = Vec::new();
    for record in reader.records() {
        if let Some(field) = record?.get(idx) {
            symbols.push(field.to_string());
        }
    }
    Ok(symbols)
}
