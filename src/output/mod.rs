//! One-shot (non-interactive) output modes.

mod json;
mod simple;

pub use json::{json_report, render_json};
pub use simple::render_simple;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::Settings;
use crate::source::build_refresher;

/// Fetch once and print plain text
pub async fn print_simple(settings: &Settings) -> Result<()> {
    let refresher = build_refresher(&settings.source, settings.ui.refresh_interval_secs);
    let snapshot = refresher
        .fetch_once()
        .await
        .context("Failed to fetch usage data")?;
    print!("{}", render_simple(&snapshot, settings.simple.bar_width, Utc::now()));
    Ok(())
}

/// Fetch once and print JSON
pub async fn print_json(settings: &Settings) -> Result<()> {
    let refresher = build_refresher(&settings.source, settings.ui.refresh_interval_secs);
    let snapshot = refresher
        .fetch_once()
        .await
        .context("Failed to fetch usage data")?;
    println!("{}", render_json(&snapshot)?);
    Ok(())
}
