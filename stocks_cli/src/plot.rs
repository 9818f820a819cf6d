//! Close-price chart rendered as a self-contained HTML file.
//!
//! The output is a single file with an inline SVG line chart, so it opens in
//! any browser without a network connection or JS dependencies.

use std::path::Path;

use anyhow::Context;
use market_data::models::bar::Bar;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const MARGIN: f64 = 50.0;

/// Render `bars` (assumed sorted, non-empty) and write the chart to `out`.
pub fn render_close_chart(ticker: &str, bars: &[Bar], out: &Path) -> anyhow::Result<()> {
    anyhow::ensure!(!bars.is_empty(), "nothing to plot for {ticker}");

    let html = chart_html(ticker, bars);
    std::fs::write(out, html).with_context(|| format!("writing plot to {}", out.display()))?;
    Ok(())
}

fn chart_html(ticker: &str, bars: &[Bar]) -> String {
    let min_close = bars.iter().map(|b| b.close).fold(f64::INFINITY, f64::min);
    let max_close = bars
        .iter()
        .map(|b| b.close)
        .fold(f64::NEG_INFINITY, f64::max);
    // Degenerate spans (one bar, or a flat series) still need a finite scale.
    let y_span = (max_close - min_close).max(1e-9);
    let x_span = (bars.len() as f64 - 1.0).max(1.0);

    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;

    let points: Vec<String> = bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let x = MARGIN + (i as f64 / x_span) * plot_w;
            let y = MARGIN + (1.0 - (b.close - min_close) / y_span) * plot_h;
            format!("{x:.1},{y:.1}")
        })
        .collect();

    // Callers guarantee `bars` is non-empty and sorted.
    let first = bars[0].timestamp.date_naive();
    let last = bars[bars.len() - 1].timestamp.date_naive();

    // `r##` because the hex colors put `"#` sequences inside the template.
    format!(
        r##"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{ticker} close</title></head>
<body>
<h2>{ticker} close, {first} to {last}</h2>
<svg width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" xmlns="http://www.w3.org/2000/svg">
  <rect x="{MARGIN}" y="{MARGIN}" width="{pw}" height="{ph}" fill="none" stroke="#ccc"/>
  <text x="{MARGIN}" y="{ty_max}" font-size="12" text-anchor="end">{max_close:.2}</text>
  <text x="{MARGIN}" y="{ty_min}" font-size="12" text-anchor="end">{min_close:.2}</text>
  <text x="{MARGIN}" y="{tx}" font-size="12">{first}</text>
  <text x="{txr}" y="{tx}" font-size="12" text-anchor="end">{last}</text>
  <polyline fill="none" stroke="#1f77b4" stroke-width="2" points="{points}"/>
</svg>
</body>
</html>
"##,
        pw = plot_w,
        ph = plot_h,
        ty_max = MARGIN + 4.0,
        ty_min = HEIGHT - MARGIN,
        tx = HEIGHT - MARGIN + 16.0,
        txr = WIDTH - MARGIN,
        points = points.join(" "),
    )
}
