//! Dashboard session: fetches raw metrics, keeps the latest answer, and republishes
//! the projected view whenever the data or the selected frequency changes.
//!
//! Every refresh takes a ticket. A response whose ticket has been overtaken by a
//! newer refresh is dropped, so the last request issued wins regardless of the
//! order in which responses arrive.

use crate::client::MetricsClient;
use arc_swap::ArcSwap;
use botmetrics_aggregate::{AggregationEngine, DashboardView};
use botmetrics_common::{DateRange, Frequency, RawMetricSeries, Result};
use botmetrics_config::DashboardConfig;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// What happened to a refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The fetched data is now the session's data
    Applied(Arc<DashboardView>),
    /// A newer refresh was issued while this one was in flight
    Superseded,
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied(_))
    }
}

#[derive(Debug)]
struct SessionState {
    raw: Arc<Vec<RawMetricSeries>>,
    frequency: Frequency,
    range: Option<DateRange>,
}

/// One user's dashboard: selected bot, frequency and range plus the last fetched data.
#[derive(Debug)]
pub struct MetricsSession {
    client: MetricsClient,
    engine: AggregationEngine,
    dashboard: DashboardConfig,
    latest_ticket: AtomicU64,
    state: Mutex<SessionState>,
    view: ArcSwap<DashboardView>,
}

impl MetricsSession {
    /// A session with no data, at the configured default frequency.
    pub fn new(client: MetricsClient, dashboard: DashboardConfig) -> Self {
        let frequency = dashboard.default_frequency;
        Self {
            client,
            engine: AggregationEngine::new(),
            dashboard,
            latest_ticket: AtomicU64::new(0),
            state: Mutex::new(SessionState {
                raw: Arc::new(Vec::new()),
                frequency,
                range: None,
            }),
            view: ArcSwap::from_pointee(DashboardView::empty(frequency)),
        }
    }

    /// Replaces the aggregation engine.
    pub fn with_engine(mut self, engine: AggregationEngine) -> Self {
        self.engine = engine;
        self
    }

    /// The most recently published view.
    pub fn view(&self) -> Arc<DashboardView> {
        self.view.load_full()
    }

    pub fn frequency(&self) -> Frequency {
        self.state.lock().frequency
    }

    /// Range of the data currently applied, if any fetch has been applied.
    pub fn range(&self) -> Option<DateRange> {
        self.state.lock().range
    }

    pub fn bot_name(&self) -> &str {
        &self.dashboard.bot_name
    }

    /// Fetches `range` and, unless a newer refresh was issued meanwhile, publishes it.
    ///
    /// Errors from a superseded fetch are swallowed; they no longer describe what
    /// the user asked for.
    #[instrument(skip(self), fields(bot_name = %self.dashboard.bot_name, range = %range))]
    pub async fn refresh(&self, range: DateRange) -> Result<RefreshOutcome> {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(ticket, "Refresh issued");

        let fetched = self
            .client
            .fetch_raw_metrics(&self.dashboard.bot_name, range)
            .await;

        let mut state = self.state.lock();
        if ticket != self.latest_ticket.load(Ordering::SeqCst) {
            debug!(ticket, "Discarding superseded response");
            return Ok(RefreshOutcome::Superseded);
        }

        let raw = fetched?;
        let view = Arc::new(self.engine.project(&raw, state.frequency)?);
        state.raw = Arc::new(raw);
        state.range = Some(range);
        self.view.store(Arc::clone(&view));

        info!(ticket, records = view.records.len(), "Published refreshed view");
        Ok(RefreshOutcome::Applied(view))
    }

    /// Switches to `frequency` and re-projects the data already held, without fetching.
    ///
    /// Fails with `UnsupportedFrequency` when the frequency is not offered.
    #[instrument(skip(self))]
    pub fn set_frequency(&self, frequency: Frequency) -> Result<Arc<DashboardView>> {
        let frequency = self.dashboard.resolve_frequency(Some(frequency.as_str()))?;
        self.apply_frequency(frequency)
    }

    /// Like [`MetricsSession::set_frequency`], from a user-supplied label.
    pub fn select_frequency(&self, requested: &str) -> Result<Arc<DashboardView>> {
        let frequency = self.dashboard.resolve_frequency(Some(requested))?;
        self.apply_frequency(frequency)
    }

    fn apply_frequency(&self, frequency: Frequency) -> Result<Arc<DashboardView>> {
        let mut state = self.state.lock();
        let view = Arc::new(self.engine.project(&state.raw, frequency)?);
        state.frequency = frequency;
        self.view.store(Arc::clone(&view));
        debug!(%frequency, records = view.records.len(), "Re-projected cached data");
        Ok(view)
    }
}
