use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDateTime};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use shared::domain::InterfaceId;
use shared::protocol::{Datapoint, InterfaceRow, MetricRecord};

use crate::error::EnrichmentError;
use crate::table::{CellContent, CellState, ColumnKind, TableHandle, COLUMN_ACTIONS};
use crate::InventoryApi;

/// Year on a last-used timestamp meaning the usage interval never ended.
const OPEN_ENDED_YEAR: i32 = 9999;

/// Query parameters meaningful only to the graph image renderer; a data
/// query must not carry them.
const RENDER_ONLY_PARAMS: &[&str] = &["height", "width", "template", "vtitle"];

/// Block characters for inline charts, lowest to highest.
const SPARK_CHARS: &[char] = &[
    '\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}', '\u{2588}',
];

/// Which instant a last-used cell renders when the port has a recorded end.
// TODO: confirm with product whether `Recorded` is the intended source; the
// shipped behavior stamps the wall clock and is kept as the default until
// that is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastUsedStamp {
    /// Stamp the current wall-clock time.
    #[default]
    WallClock,
    /// Stamp the timestamp the API returned.
    Recorded,
}

#[derive(Debug, Clone)]
pub enum EnrichmentEvent {
    CellUpdated {
        interface: InterfaceId,
        column: String,
        state: CellState,
    },
}

/// Fills visible dynamic columns on the current page, one asynchronous
/// fetch chain per empty cell. Results from a superseded draw are dropped
/// by a generation check before they touch the table.
pub struct ColumnEnrichmentController {
    table: Arc<dyn TableHandle>,
    api: Arc<dyn InventoryApi>,
    stamp: LastUsedStamp,
    generation: AtomicU64,
    events: broadcast::Sender<EnrichmentEvent>,
}

impl ColumnEnrichmentController {
    pub fn new(table: Arc<dyn TableHandle>, api: Arc<dyn InventoryApi>) -> Arc<Self> {
        Self::with_stamp(table, api, LastUsedStamp::default())
    }

    pub fn with_stamp(
        table: Arc<dyn TableHandle>,
        api: Arc<dyn InventoryApi>,
        stamp: LastUsedStamp,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            table,
            api,
            stamp,
            generation: AtomicU64::new(0),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<EnrichmentEvent> {
        self.events.subscribe()
    }

    /// The table finished a (re)draw: open a new generation and re-evaluate
    /// every dynamic column. Returns the spawned per-cell tasks so callers
    /// can await completion.
    pub async fn on_draw(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.check_dynamic_columns().await
    }

    /// The user toggled a column on or off. Same pass, same generation:
    /// results still belong to the draw in view.
    pub async fn on_column_visibility_changed(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        self.check_dynamic_columns().await
    }

    /// Convenience for batch callers: run one draw pass and wait for every
    /// cell task to settle.
    pub async fn run_draw_to_completion(self: &Arc<Self>) {
        let tasks = self.on_draw().await;
        for joined in futures::future::join_all(tasks).await {
            if let Err(err) = joined {
                warn!("enrichment cell task panicked: {err}");
            }
        }
    }

    async fn check_dynamic_columns(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let generation = self.generation.load(Ordering::SeqCst);
        let mut tasks = Vec::new();
        for (column, kind) in COLUMN_ACTIONS.iter().copied() {
            if !self.table.is_column_visible(column).await {
                continue;
            }
            for row in self.table.current_page().await {
                if !self.table.cell_state(row.id, column).await.is_pending() {
                    continue;
                }
                let controller = Arc::clone(self);
                tasks.push(tokio::spawn(async move {
                    controller.enrich_cell(row, column, kind, generation).await;
                }));
            }
        }
        tasks
    }

    async fn enrich_cell(
        &self,
        row: InterfaceRow,
        column: &'static str,
        kind: ColumnKind,
        generation: u64,
    ) {
        let outcome = match kind {
            ColumnKind::Sparkline { suffix } => self.sparkline_cell(row.id, suffix).await,
            ColumnKind::LastUsed => self.last_used_cell(&row).await,
        };
        let state = match outcome {
            Ok(Some(content)) => CellState::Loaded(content),
            // Nothing to render; the cell stays pending and the next draw
            // inspects it again.
            Ok(None) => return,
            Err(err) => {
                warn!(interface = row.id.0, column, "cell enrichment failed: {err}");
                CellState::Unavailable(err.to_string())
            }
        };
        self.apply(row.id, column, state, generation).await;
    }

    /// Writes a finished result into the table unless a newer draw has
    /// started since the chain began.
    async fn apply(&self, interface: InterfaceId, column: &str, state: CellState, generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                interface = interface.0,
                column, "dropping enrichment result from superseded draw"
            );
            return;
        }
        self.table.set_cell(interface, column, state.clone()).await;
        let _ = self.events.send(EnrichmentEvent::CellUpdated {
            interface,
            column: column.to_string(),
            state,
        });
    }

    /// Metric lookup, URL rewrite, series fetch, chart render. Strictly
    /// sequential within the cell.
    async fn sparkline_cell(
        &self,
        interface: InterfaceId,
        suffix: &str,
    ) -> Result<Option<CellContent>, EnrichmentError> {
        let metrics = self.api.interface_metrics(interface).await.map_err(|source| {
            EnrichmentError::MetricsFetch {
                interface: interface.0,
                source,
            }
        })?;
        let Some(url) = data_url_for_suffix(&metrics, suffix) else {
            return Ok(None);
        };
        let series = self.api.fetch_series(&url).await.map_err(|source| {
            EnrichmentError::SeriesFetch {
                interface: interface.0,
                source,
            }
        })?;
        let charts: Vec<String> = series
            .iter()
            .map(|s| render_sparkline(&chart_points(&s.datapoints)))
            .collect();
        if charts.is_empty() {
            return Ok(None);
        }
        Ok(Some(CellContent::Sparklines(charts)))
    }

    async fn last_used_cell(
        &self,
        row: &InterfaceRow,
    ) -> Result<Option<CellContent>, EnrichmentError> {
        let response = self
            .api
            .interface_last_used(row.id)
            .await
            .map_err(|source| EnrichmentError::LastUsedFetch {
                interface: row.id.0,
                source,
            })?;
        let open_ended = response
            .last_used
            .is_some_and(|stamp| stamp.year() == OPEN_ENDED_YEAR);
        if row.ifoperstatus.is_up() || open_ended {
            return Ok(Some(CellContent::Text("In use".to_string())));
        }
        match response.last_used {
            Some(recorded) => Ok(Some(CellContent::Text(self.format_stamp(recorded)))),
            None => Ok(None),
        }
    }

    fn format_stamp(&self, recorded: NaiveDateTime) -> String {
        let shown = match self.stamp {
            LastUsedStamp::WallClock => Local::now().naive_local(),
            LastUsedStamp::Recorded => recorded,
        };
        shown.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// One plotted sample: the series value rounded to a whole number, keyed by
/// its timestamp. `None` marks a gap in the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPoint {
    pub value: Option<i64>,
    pub timestamp: i64,
}

/// Picks the metric matching `suffix` (first wins) and rewrites its URL for
/// a data query: rendering-only parameters go away and the response format
/// is forced to json. Unparseable metric URLs yield no chart.
fn data_url_for_suffix(metrics: &[MetricRecord], suffix: &str) -> Option<Url> {
    let record = metrics.iter().find(|m| m.suffix == suffix)?;
    let url = Url::parse(&record.url).ok()?;
    Some(rewrite_for_data(url))
}

fn rewrite_for_data(url: Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "format" && !RENDER_ONLY_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut rewritten = url;
    rewritten
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("format", "json");
    rewritten
}

fn chart_points(datapoints: &[Datapoint]) -> Vec<ChartPoint> {
    datapoints
        .iter()
        .map(|point| ChartPoint {
            value: point.value.map(|v| v.round() as i64),
            timestamp: point.timestamp,
        })
        .collect()
}

/// Renders one block-character chart, scaled against the series maximum.
/// Gaps render as spaces.
fn render_sparkline(points: &[ChartPoint]) -> String {
    let max = points
        .iter()
        .filter_map(|p| p.value)
        .max()
        .unwrap_or(0)
        .max(1);
    points
        .iter()
        .map(|point| match point.value {
            None => ' ',
            Some(value) => {
                let ratio = value.max(0) as f64 / max as f64;
                let idx = (ratio * (SPARK_CHARS.len() - 1) as f64).round() as usize;
                SPARK_CHARS[idx.min(SPARK_CHARS.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/enrichment_tests.rs"]
mod tests;
