use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use shared::domain::InterfaceId;
use shared::protocol::InterfaceRow;

use crate::InventoryApi;

/// Enrichment action a dynamic column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Fetch the metric matching `suffix` and draw one inline chart per
    /// returned series.
    Sparkline { suffix: &'static str },
    /// Fetch last-used metadata and render it as text.
    LastUsed,
}

/// Static mapping from column name to enrichment action. Columns not listed
/// here are filled by the table's primary data source and never enriched.
pub const COLUMN_ACTIONS: &[(&str, ColumnKind)] = &[
    (
        "traffic-ifinoctets",
        ColumnKind::Sparkline {
            suffix: "ifInOctets",
        },
    ),
    (
        "traffic-ifoutoctets",
        ColumnKind::Sparkline {
            suffix: "ifOutOctets",
        },
    ),
    ("last_used", ColumnKind::LastUsed),
];

/// Rendered artifact held by an enriched cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// One sparkline string per series in the response.
    Sparklines(Vec<String>),
    Text(String),
}

/// Lifecycle of a dynamic cell. `Pending` is the only state an enrichment
/// pass acts on; `Unavailable` is terminal until the next reload resets the
/// page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Pending,
    Loaded(CellContent),
    Unavailable(String),
}

impl CellState {
    pub fn is_pending(&self) -> bool {
        matches!(self, CellState::Pending)
    }
}

/// Seam to the hosting page's table widget. Controllers hold a shared
/// handle; the page owns the grid.
#[async_trait]
pub trait TableHandle: Send + Sync {
    async fn is_column_visible(&self, column: &str) -> bool;
    /// Rows currently in view. Enrichment is bounded to these.
    async fn current_page(&self) -> Vec<InterfaceRow>;
    async fn cell_state(&self, interface: InterfaceId, column: &str) -> CellState;
    async fn set_cell(&self, interface: InterfaceId, column: &str, state: CellState);
    /// Point the table's data source at `url`, re-fetch and redraw.
    async fn reload(&self, url: Url) -> Result<()>;
}

/// In-memory [`TableHandle`] used by the CLI and tests. Holds one page of
/// rows; `reload` replaces them through the API client and resets every
/// dynamic cell.
pub struct MemoryTable {
    api: Arc<dyn InventoryApi>,
    inner: RwLock<MemoryTableInner>,
}

#[derive(Default)]
struct MemoryTableInner {
    rows: Vec<InterfaceRow>,
    visible: HashSet<String>,
    cells: HashMap<(InterfaceId, String), CellState>,
}

impl MemoryTable {
    pub fn new(api: Arc<dyn InventoryApi>) -> Arc<Self> {
        Arc::new(Self {
            api,
            inner: RwLock::new(MemoryTableInner::default()),
        })
    }

    pub async fn set_rows(&self, rows: Vec<InterfaceRow>) {
        let mut inner = self.inner.write().await;
        inner.rows = rows;
        inner.cells.clear();
    }

    pub async fn set_column_visible(&self, column: &str, visible: bool) {
        let mut inner = self.inner.write().await;
        if visible {
            inner.visible.insert(column.to_string());
        } else {
            inner.visible.remove(column);
        }
    }
}

#[async_trait]
impl TableHandle for MemoryTable {
    async fn is_column_visible(&self, column: &str) -> bool {
        self.inner.read().await.visible.contains(column)
    }

    async fn current_page(&self) -> Vec<InterfaceRow> {
        self.inner.read().await.rows.clone()
    }

    async fn cell_state(&self, interface: InterfaceId, column: &str) -> CellState {
        self.inner
            .read()
            .await
            .cells
            .get(&(interface, column.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    async fn set_cell(&self, interface: InterfaceId, column: &str, state: CellState) {
        self.inner
            .write()
            .await
            .cells
            .insert((interface, column.to_string()), state);
    }

    async fn reload(&self, url: Url) -> Result<()> {
        let page = self.api.fetch_interfaces(&url).await?;
        let mut inner = self.inner.write().await;
        inner.rows = page.results;
        inner.cells.clear();
        Ok(())
    }
}
