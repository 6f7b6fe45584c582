//! Partitioned table writer
//!
//! `write` encodes every partition on the blocking pool, then clears the
//! table's destination, writes one Parquet file per partition and finally a
//! `_SUCCESS` marker. The sequence is not atomic: a
//! failure part-way leaves the table empty or partially written, and tables
//! written earlier in the same run stay in place.

use super::destination::Destination;
use super::partition::partition_batch;
use super::writer::{encode_parquet, ParquetWriterConfig};
use crate::error::{Error, Result};
use crate::warehouse::WarehouseTable;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use bytes::Bytes;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Name of the data file written into each partition directory
pub const DATA_FILE_NAME: &str = "part-00000.parquet";

/// Name of the marker written once a table is complete
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Storage operations the table writer needs
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Remove everything stored for a table; missing output is success
    async fn remove_table(&self, table: &str) -> Result<usize>;

    /// Store one file at a path relative to the destination root
    async fn put_file(&self, path: &str, data: Bytes) -> Result<String>;
}

#[async_trait]
impl TableSink for Destination {
    async fn remove_table(&self, table: &str) -> Result<usize> {
        self.remove_dir(table).await
    }

    async fn put_file(&self, path: &str, data: Bytes) -> Result<String> {
        self.put(path, data).await
    }
}

/// Outcome of writing one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableWriteSummary {
    /// Table name
    pub table: String,
    /// Rows written
    pub rows: usize,
    /// Partition directories written
    pub partitions: usize,
    /// Files removed before writing
    pub files_removed: usize,
    /// Data files written
    pub files: Vec<String>,
}

/// Writes tables through a sink
pub struct TableWriter<S: TableSink> {
    /// Storage sink
    sink: S,
    /// Parquet settings
    config: ParquetWriterConfig,
}

impl<S: TableSink> TableWriter<S> {
    /// Create a writer with default Parquet settings
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            config: ParquetWriterConfig::default(),
        }
    }

    /// Set Parquet settings
    #[must_use]
    pub fn with_config(mut self, config: ParquetWriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the sink
    #[cfg(test)]
    pub(crate) fn sink(&self) -> &S {
        &self.sink
    }

    /// Replace the table at `table` with `batch`, partitioned by `partition_columns`
    pub async fn write(
        &self,
        table: &str,
        batch: &RecordBatch,
        partition_columns: &[&str],
    ) -> Result<TableWriteSummary> {
        let encoded = encode_partitions(table, batch, partition_columns, &self.config).await?;

        let files_removed = self
            .sink
            .remove_table(table)
            .await
            .map_err(|e| Error::table_write(table, format!("Failed to clear destination: {e}")))?;
        debug!(table, files_removed, "Cleared table destination");

        if encoded.is_empty() {
            warn!(table, "Table has no rows; no data files written");
        }

        let mut files = Vec::with_capacity(encoded.len());
        for file in encoded {
            let written = self
                .sink
                .put_file(&file.relative, file.data)
                .await
                .map_err(|e| Error::table_write(table, e.to_string()))?;
            debug!(table, file = %written, rows = file.rows, "Wrote partition");
            files.push(file.relative);
        }

        self.sink
            .put_file(&format!("{table}/{SUCCESS_MARKER}"), Bytes::new())
            .await
            .map_err(|e| Error::table_write(table, e.to_string()))?;

        let partitions = if partition_columns.is_empty() {
            0
        } else {
            files.len()
        };

        info!(
            table,
            rows = batch.num_rows(),
            partitions,
            files = files.len(),
            "Wrote table"
        );

        Ok(TableWriteSummary {
            table: table.to_string(),
            rows: batch.num_rows(),
            partitions,
            files_removed,
            files,
        })
    }

    /// Convert warehouse rows and write them to their table
    pub async fn write_rows<T: WarehouseTable>(&self, rows: &[T]) -> Result<TableWriteSummary> {
        let batch = T::to_batch(rows)?;
        self.write(T::TABLE.as_str(), &batch, T::TABLE.partition_columns())
            .await
    }
}

/// One encoded data file
struct EncodedPartition {
    /// Path relative to the destination root
    relative: String,
    /// Rows in the file
    rows: usize,
    /// Parquet bytes
    data: Bytes,
}

/// Split a batch into partitions and encode each one, on the blocking pool
async fn encode_partitions(
    table: &str,
    batch: &RecordBatch,
    partition_columns: &[&str],
    config: &ParquetWriterConfig,
) -> Result<Vec<EncodedPartition>> {
    let name = table.to_string();
    let batch = batch.clone();
    let columns: Vec<String> = partition_columns.iter().map(|c| (*c).to_string()).collect();
    let config = config.clone();

    tokio::task::spawn_blocking(move || {
        let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
        let slices = partition_batch(&batch, &columns)
            .map_err(|e| Error::table_write(&name, e.to_string()))?;

        slices
            .into_par_iter()
            .map(|slice| {
                let relative = if slice.path.is_empty() {
                    format!("{name}/{DATA_FILE_NAME}")
                } else {
                    format!("{name}/{}/{DATA_FILE_NAME}", slice.path)
                };
                let data = encode_parquet(&slice.batch, &config)
                    .map_err(|e| Error::table_write(&name, e.to_string()))?;
                Ok(EncodedPartition {
                    relative,
                    rows: slice.batch.num_rows(),
                    data,
                })
            })
            .collect()
    })
    .await
    .map_err(|e| Error::table_write(table, format!("Encoding task failed: {e}")))?
}
