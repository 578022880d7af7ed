use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use shared::domain::NetboxId;
use shared::protocol::NetboxSuggestion;

use crate::table::TableHandle;
use crate::InventoryApi;

/// Quiet window before a keystroke-driven reload or an autocomplete query
/// fires.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Shortest device-name prefix worth completing.
const MIN_COMPLETION_LEN: usize = 2;

/// Path the table's row data is served from, relative to the API root.
const INTERFACE_LIST_PATH: &str = "api/1/interface/";

/// Current value of every filter widget. Immutable: edits go through
/// [`FilterState::apply`], widgets read the result back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Accumulated multi-select of device ids.
    pub netbox: Vec<NetboxId>,
    pub ifclass: Option<String>,
    pub search: Option<String>,
    pub ifoperstatus: Option<String>,
}

/// One widget edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    SelectNetbox(NetboxId),
    DeselectNetbox(NetboxId),
    SetIfClass(Option<String>),
    SetSearch(Option<String>),
    SetOperStatus(Option<String>),
}

impl FilterState {
    /// Pure reducer: current state plus one edit gives the next state.
    /// Empty strings normalize to no filter; re-selecting or deselecting an
    /// absent netbox is a no-op.
    pub fn apply(&self, change: FilterChange) -> FilterState {
        let mut next = self.clone();
        match change {
            FilterChange::SelectNetbox(id) => {
                if !next.netbox.contains(&id) {
                    next.netbox.push(id);
                }
            }
            FilterChange::DeselectNetbox(id) => next.netbox.retain(|existing| *existing != id),
            FilterChange::SetIfClass(value) => next.ifclass = normalize(value),
            FilterChange::SetSearch(value) => next.search = normalize(value),
            FilterChange::SetOperStatus(value) => next.ifoperstatus = normalize(value),
        }
        next
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

type FilterFn = fn(&FilterState) -> Vec<(String, String)>;

/// Each filter contributes the parameters for one widget; absent values
/// contribute nothing.
const FILTERS: &[FilterFn] = &[netbox_filter, ifclass_filter, query_filter, link_filter];

fn netbox_filter(state: &FilterState) -> Vec<(String, String)> {
    state
        .netbox
        .iter()
        .map(|id| ("netbox".to_string(), id.0.to_string()))
        .collect()
}

fn ifclass_filter(state: &FilterState) -> Vec<(String, String)> {
    state
        .ifclass
        .iter()
        .map(|value| ("ifclass".to_string(), value.clone()))
        .collect()
}

fn query_filter(state: &FilterState) -> Vec<(String, String)> {
    state
        .search
        .iter()
        .map(|value| ("search".to_string(), value.clone()))
        .collect()
}

fn link_filter(state: &FilterState) -> Vec<(String, String)> {
    state
        .ifoperstatus
        .iter()
        .map(|value| ("ifoperstatus".to_string(), value.clone()))
        .collect()
}

/// Combined parameter set from every filter. Pure. A later filter's key
/// displaces an earlier contribution under the same key, though keys are
/// disjoint in practice.
pub fn build_query(state: &FilterState) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();
    for filter in FILTERS {
        let contribution = filter(state);
        params.retain(|(key, _)| !contribution.iter().any(|(new_key, _)| new_key == key));
        params.extend(contribution);
    }
    params
}

/// The full interface-list request URL for `state`.
pub fn request_url(api_root: &Url, state: &FilterState) -> Result<Url> {
    let mut url = api_root.join(INTERFACE_LIST_PATH)?;
    let params = build_query(state);
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(url)
}

/// Keystroke classification for the free-text search field. Only keys that
/// change the text arm the debounced reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Char(char),
    Backspace,
    Delete,
    Other,
}

impl SearchKey {
    fn edits_text(self) -> bool {
        matches!(self, SearchKey::Char(_) | SearchKey::Backspace | SearchKey::Delete)
    }
}

#[derive(Debug, Clone)]
pub enum FilterEvent {
    Reloaded { url: Url },
    Suggestions { options: Vec<NetboxSuggestion> },
}

/// Keeps the table's data source in sync with the filter state: immediate
/// reload on widget change, debounced reload on search keystrokes, and a
/// debounced device-name autocompleter.
pub struct FilterController {
    table: Arc<dyn TableHandle>,
    api: Arc<dyn InventoryApi>,
    api_root: Url,
    state: Mutex<FilterState>,
    reload_debounce: Mutex<Option<JoinHandle<()>>>,
    suggest_debounce: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<FilterEvent>,
}

impl FilterController {
    pub fn new(table: Arc<dyn TableHandle>, api: Arc<dyn InventoryApi>, api_root: Url) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            table,
            api,
            api_root,
            state: Mutex::new(FilterState::default()),
            reload_debounce: Mutex::new(None),
            suggest_debounce: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FilterEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the current filter state for widgets to render from.
    pub async fn state(&self) -> FilterState {
        self.state.lock().await.clone()
    }

    /// A filter widget changed: reduce the edit into the state and reload
    /// immediately.
    pub async fn dispatch(&self, change: FilterChange) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            *state = state.apply(change);
        }
        self.reload().await
    }

    /// A keystroke landed in the search field. `text` is the field's full
    /// content after the keystroke; it is stored right away, but the reload
    /// waits for a quiet window, and only text-editing keys arm it.
    pub async fn search_keystroke(self: &Arc<Self>, key: SearchKey, text: impl Into<String>) {
        {
            let mut state = self.state.lock().await;
            *state = state.apply(FilterChange::SetSearch(Some(text.into())));
        }
        if !key.edits_text() {
            return;
        }
        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE_WINDOW).await;
            if let Err(err) = controller.reload().await {
                warn!("debounced reload failed: {err}");
            }
        });
        rearm(&self.reload_debounce, task).await;
    }

    /// Recompute the request URL from current state and point the table at
    /// it.
    pub async fn reload(&self) -> Result<()> {
        let url = {
            let state = self.state.lock().await;
            request_url(&self.api_root, &state)?
        };
        debug!(url = %url, "reloading interface table");
        self.table.reload(url.clone()).await?;
        let _ = self.events.send(FilterEvent::Reloaded { url });
        Ok(())
    }

    /// The user typed into the device filter. Short terms clear the option
    /// list; longer ones query the autocomplete endpoint after a quiet
    /// window and emit the matching options.
    pub async fn suggest_netboxes(self: &Arc<Self>, term: impl Into<String>) {
        let term = term.into();
        if term.chars().count() < MIN_COMPLETION_LEN {
            if let Some(previous) = self.suggest_debounce.lock().await.take() {
                previous.abort();
            }
            let _ = self.events.send(FilterEvent::Suggestions {
                options: Vec::new(),
            });
            return;
        }
        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE_WINDOW).await;
            match controller.api.search_netboxes(&term).await {
                Ok(options) => {
                    let _ = controller.events.send(FilterEvent::Suggestions { options });
                }
                Err(err) => warn!("netbox autocomplete failed for {term:?}: {err}"),
            }
        });
        rearm(&self.suggest_debounce, task).await;
    }
}

/// Trailing-edge debounce: the newest task replaces (and cancels) the
/// previous one, so only the last event inside the window fires.
async fn rearm(slot: &Mutex<Option<JoinHandle<()>>>, task: JoinHandle<()>) {
    let mut guard = slot.lock().await;
    if let Some(previous) = guard.replace(task) {
        previous.abort();
    }
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
