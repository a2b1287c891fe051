//! # botmetrics cli
//!
//! Command implementations behind the `botmetrics` binary: fetch a bot's metrics
//! from the backend or aggregate an exported JSON file, then render the dashboard
//! view as JSON or as a plain-text summary.

#![warn(clippy::all)]

use anyhow::{Context, Result};
use botmetrics_aggregate::{compare_period_keys, AggregationEngine, DashboardView, MetricCatalog};
use botmetrics_client::{MetricsClient, MetricsSession, RefreshOutcome};
use botmetrics_common::{DateRange, Frequency, RawMetricSeries};
use botmetrics_config::Config;
use clap::ValueEnum;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{info, warn};

/// How a dashboard view is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// The whole view as pretty-printed JSON
    #[default]
    Json,
    /// One line per summary card
    Summary,
}

/// Reads a JSON array of raw metric series from `path` and projects it.
pub fn aggregate_file(path: &Path, frequency: Frequency) -> Result<DashboardView> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read metrics export {}", path.display()))?;
    let raw: Vec<RawMetricSeries> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of metric series", path.display()))?;
    info!("Loaded {} metric series from {}", raw.len(), path.display());

    let view = AggregationEngine::new().project(&raw, frequency)?;
    Ok(view)
}

/// Fetches `bot_name`'s metrics over `range` and projects them at `frequency`.
pub async fn fetch_view(
    config: &Config,
    bot_name: &str,
    range: DateRange,
    frequency: Frequency,
) -> Result<DashboardView> {
    let frequency = config.dashboard.resolve_frequency(Some(frequency.as_str()))?;
    let client = MetricsClient::from_backend_config(&config.backend)?;
    let mut dashboard = config.dashboard.clone();
    dashboard.bot_name = bot_name.to_string();
    dashboard.default_frequency = frequency;
    let session = MetricsSession::new(client, dashboard);

    let view = match session.refresh(range).await? {
        RefreshOutcome::Applied(view) => view,
        RefreshOutcome::Superseded => {
            warn!("Refresh was superseded");
            session.view()
        }
    };
    Ok(view.as_ref().clone())
}

/// Renders a view in the requested format.
pub fn render(view: &DashboardView, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
        OutputFormat::Summary => Ok(render_summary(view)),
    }
}

fn render_summary(view: &DashboardView) -> String {
    let mut out = String::new();
    let periods = || view.records.iter().map(|r| r.period.as_str());
    let first = periods().min_by(|a, b| compare_period_keys(a, b)).unwrap_or("-");
    let last = periods().max_by(|a, b| compare_period_keys(a, b)).unwrap_or("-");
    let _ = writeln!(
        out,
        "{} periods: {} ({} to {})",
        view.frequency.display_name(),
        view.records.len(),
        first,
        last
    );
    for card in &view.cards {
        let _ = writeln!(out, "{:<54} {:>12}  {}", card.metric, card.value, card.description);
    }
    out
}

/// Lists the known metrics with their descriptions.
pub fn render_catalog(catalog: &MetricCatalog) -> String {
    let mut out = String::new();
    for entry in catalog.entries() {
        let _ = writeln!(out, "{:<54} {}", entry.name, entry.description);
    }
    out
}
