use thiserror::Error;

/// Failure at a specific stage of one cell's enrichment chain. The display
/// form is what lands in [`crate::table::CellState::Unavailable`].
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("metric list fetch failed for interface {interface}: {source}")]
    MetricsFetch {
        interface: i64,
        source: anyhow::Error,
    },
    #[error("series fetch failed for interface {interface}: {source}")]
    SeriesFetch {
        interface: i64,
        source: anyhow::Error,
    },
    #[error("last-used fetch failed for interface {interface}: {source}")]
    LastUsedFetch {
        interface: i64,
        source: anyhow::Error,
    },
}
