//! Output module
//!
//! Persists warehouse tables as partitioned Parquet datasets.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Encoding Arrow RecordBatches as Parquet
//! - Splitting batches into Hive-style partitions (`col=value/`)
//! - Object storage destinations (local, S3, R2, GCS, Azure, in-memory)
//! - Replace-then-write table output through a `TableSink`

mod destination;
mod partition;
mod table;
mod writer;

pub use destination::Destination;
pub use partition::{partition_batch, partition_value, PartitionSlice, DEFAULT_PARTITION_NAME};
pub use table::{
    TableSink, TableWriteSummary, TableWriter, DATA_FILE_NAME, SUCCESS_MARKER,
};
pub use writer::{encode_parquet, ParquetWriter, ParquetWriterConfig};
