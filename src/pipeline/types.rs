//! Pipeline types
//!
//! Run statistics reported after a pipeline run.

use crate::output::TableWriteSummary;
use serde::Serialize;

/// Statistics for one pipeline run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Catalog records read
    pub catalog_records: usize,
    /// Event log records read
    pub events_read: usize,
    /// Events that passed the play-event filter
    pub play_events: usize,
    /// Songplays whose title matched a song
    pub matched_songs: usize,
    /// Songplays whose artist name matched an artist
    pub matched_artists: usize,
    /// Per-table write results, in write order
    pub tables: Vec<TableWriteSummary>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows written to a table, if it was written
    pub fn rows_written(&self, table: &str) -> Option<usize> {
        self.tables.iter().find(|t| t.table == table).map(|t| t.rows)
    }

    /// Total rows written across all tables
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}
