//! Pipeline module
//!
//! Wires the source reader, transformation stages and table writer.
//!
//! # Overview
//!
//! The pipeline module provides:
//! - `Pipeline` - Runs catalog processing, then event processing
//! - `RunSummary` - Record counts and per-table write results
//!
//! Every run recomputes all tables from the sources and replaces previous
//! output table by table. The fact table needs the song/artist dimensions,
//! so event processing takes the `Dimensions` returned by catalog
//! processing.

mod types;

pub use types::RunSummary;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::output::{Destination, TableSink, TableWriter};
use crate::source::{FilePattern, LogEvent, SongCatalogRecord, SourceLocation};
use crate::transform::{
    aggregate_users, build_songplays, build_time_table, extract_dimensions, filter_play_events,
    Dimensions,
};
use crate::warehouse::{SongplayRecord, TimeRecord, UserRecord};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Warehouse pipeline bound to a source and a destination
pub struct Pipeline<S: TableSink> {
    /// Pipeline configuration
    config: PipelineConfig,
    /// Where `song_data/` and `log_data/` are read from
    source: SourceLocation,
    /// Table writer
    writer: TableWriter<S>,
}

impl Pipeline<Destination> {
    /// Create a pipeline writing to the configured destination
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let destination = Destination::parse(&config.output, &config.credentials)?;
        info!(
            output = %config.output,
            scheme = destination.scheme(),
            cloud = destination.is_cloud(),
            "Opened destination"
        );
        Self::with_sink(config, destination)
    }
}

impl<S: TableSink> Pipeline<S> {
    /// Create a pipeline reading the configured input and writing through
    /// the given sink
    pub fn with_sink(config: PipelineConfig, sink: S) -> Result<Self> {
        let source = SourceLocation::parse(&config.input, &config.credentials)?;
        debug!(input = %config.input, remote = source.is_remote(), "Resolved source");
        let writer = TableWriter::new(sink).with_config(config.parquet.writer_config());
        Ok(Self {
            config,
            source,
            writer,
        })
    }

    /// Read sources from `source` instead of the configured input
    #[must_use]
    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = source;
        self
    }

    /// Get the table writer
    #[cfg(test)]
    pub(crate) fn writer(&self) -> &TableWriter<S> {
        &self.writer
    }

    /// Run catalog then event processing
    pub async fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        let mut summary = RunSummary::new();

        let dimensions = self.process_song_data(&mut summary).await?;
        self.process_log_data(&dimensions, &mut summary).await?;

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            tables = summary.tables.len(),
            rows = summary.total_rows(),
            duration_ms = summary.duration_ms,
            "Pipeline finished"
        );
        Ok(summary)
    }

    /// Read the catalog, write `songs_table` and `artists_table`
    ///
    /// Returns the dimensions for the fact builder.
    pub async fn process_song_data(&self, summary: &mut RunSummary) -> Result<Dimensions> {
        let records: Vec<SongCatalogRecord> =
            self.read_source(self.config.song_file_pattern()?).await?;
        summary.catalog_records = records.len();
        info!(records = records.len(), "Read song catalog");

        let dimensions =
            run_blocking("Catalog transform", move || Ok(extract_dimensions(&records))).await?;

        summary
            .tables
            .push(self.writer.write_rows(&dimensions.songs[..]).await?);
        summary
            .tables
            .push(self.writer.write_rows(&dimensions.artists[..]).await?);

        Ok(dimensions)
    }

    /// Read the event log, write `users_table`, `time_table` and `songplays_table`
    ///
    /// All three tables are built before the first is written.
    pub async fn process_log_data(
        &self,
        dimensions: &Dimensions,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let events: Vec<LogEvent> = self.read_source(self.config.log_file_pattern()?).await?;
        summary.events_read = events.len();

        let dimensions = dimensions.clone();
        let tables =
            run_blocking("Event transform", move || build_event_tables(events, &dimensions))
                .await?;
        summary.play_events = tables.play_events;
        info!(
            events = summary.events_read,
            plays = tables.play_events,
            "Filtered play events"
        );

        summary
            .tables
            .push(self.writer.write_rows(&tables.users).await?);
        summary
            .tables
            .push(self.writer.write_rows(&tables.times).await?);

        let songplays = &tables.songplays;
        summary.matched_songs = songplays.iter().filter(|s| s.song_id.is_some()).count();
        summary.matched_artists = songplays.iter().filter(|s| s.artist_id.is_some()).count();
        info!(
            songplays = songplays.len(),
            matched_songs = summary.matched_songs,
            matched_artists = summary.matched_artists,
            "Built songplays"
        );
        summary.tables.push(self.writer.write_rows(songplays).await?);

        Ok(())
    }

    /// Read every record a pattern selects from the source
    async fn read_source<T>(&self, pattern: FilePattern) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let selected = pattern.as_str().to_string();
        self.source.read_all(pattern).await.inspect_err(|e| {
            if e.is_source_error() {
                warn!(input = %self.config.input, pattern = %selected, error = %e, "Source read failed");
            }
        })
    }
}

/// Rows of the three event-derived tables
struct EventTables {
    play_events: usize,
    users: Vec<UserRecord>,
    times: Vec<TimeRecord>,
    songplays: Vec<SongplayRecord>,
}

fn build_event_tables(events: Vec<LogEvent>, dimensions: &Dimensions) -> Result<EventTables> {
    let plays = filter_play_events(events);
    let users = aggregate_users(&plays);
    let times = build_time_table(&plays)?;

    let lookup = dimensions.lookup();
    debug!(
        titles = lookup.song_count(),
        artist_names = lookup.artist_count(),
        "Indexed song and artist dimensions"
    );
    let songplays = build_songplays(&plays, &lookup)?;

    Ok(EventTables {
        play_events: plays.len(),
        users,
        times,
        songplays,
    })
}

/// Run CPU-bound work on the blocking pool
async fn run_blocking<T, F>(stage: &'static str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Other(format!("{stage} task failed: {e}")))?
}

#[cfg(test)]
mod tests;
