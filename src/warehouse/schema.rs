//! Arrow schemas for warehouse tables
//!
//! Column order matches the table layout; partition columns are included
//! here and split off by the writer.

use super::types::{ArtistRecord, SongRecord, SongplayRecord, TimeRecord, UserRecord};
use crate::error::Result;
use crate::types::TableName;
use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// A row type that maps onto one warehouse table
pub trait WarehouseTable: Sized {
    /// Table this row type belongs to
    const TABLE: TableName;

    /// Arrow schema of the table
    fn schema() -> SchemaRef;

    /// Convert rows into a single RecordBatch
    fn to_batch(rows: &[Self]) -> Result<RecordBatch>;
}

fn strings<T>(rows: &[T], f: impl Fn(&T) -> Option<&str>) -> ArrayRef {
    Arc::new(rows.iter().map(f).collect::<StringArray>())
}

fn int64s<T>(rows: &[T], f: impl Fn(&T) -> Option<i64>) -> ArrayRef {
    Arc::new(rows.iter().map(f).collect::<Int64Array>())
}

fn int32s<T>(rows: &[T], f: impl Fn(&T) -> i32) -> ArrayRef {
    Arc::new(rows.iter().map(|r| Some(f(r))).collect::<Int32Array>())
}

fn float64s<T>(rows: &[T], f: impl Fn(&T) -> Option<f64>) -> ArrayRef {
    Arc::new(rows.iter().map(f).collect::<Float64Array>())
}

// ============================================================================
// Songs
// ============================================================================

impl WarehouseTable for SongRecord {
    const TABLE: TableName = TableName::Songs;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, true),
            Field::new("title", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("year", DataType::Int64, true),
            Field::new("duration", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns = vec![
            strings(rows, |r| r.song_id.as_deref()),
            strings(rows, |r| r.title.as_deref()),
            strings(rows, |r| r.artist_id.as_deref()),
            int64s(rows, |r| r.year),
            float64s(rows, |r| r.duration),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

// ============================================================================
// Artists
// ============================================================================

impl WarehouseTable for ArtistRecord {
    const TABLE: TableName = TableName::Artists;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("name", DataType::Utf8, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns = vec![
            strings(rows, |r| r.artist_id.as_deref()),
            strings(rows, |r| r.name.as_deref()),
            strings(rows, |r| r.location.as_deref()),
            float64s(rows, |r| r.latitude),
            float64s(rows, |r| r.longitude),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

// ============================================================================
// Time
// ============================================================================

impl WarehouseTable for TimeRecord {
    const TABLE: TableName = TableName::Time;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("start_time", DataType::Int64, false),
            Field::new("hour", DataType::Int32, false),
            Field::new("day", DataType::Int32, false),
            Field::new("week", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
            Field::new("year", DataType::Int32, false),
            Field::new("weekday", DataType::Int32, false),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns = vec![
            int64s(rows, |r| Some(r.start_time)),
            int32s(rows, |r| r.hour),
            int32s(rows, |r| r.day),
            int32s(rows, |r| r.week),
            int32s(rows, |r| r.month),
            int32s(rows, |r| r.year),
            int32s(rows, |r| r.weekday),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

// ============================================================================
// Users
// ============================================================================

impl WarehouseTable for UserRecord {
    const TABLE: TableName = TableName::Users;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("user_id", DataType::Utf8, true),
            Field::new("first_name", DataType::Utf8, true),
            Field::new("last_name", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns = vec![
            strings(rows, |r| r.user_id.as_deref()),
            strings(rows, |r| r.first_name.as_deref()),
            strings(rows, |r| r.last_name.as_deref()),
            strings(rows, |r| r.gender.as_deref()),
            strings(rows, |r| r.level.as_deref()),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

// ============================================================================
// Songplays
// ============================================================================

impl WarehouseTable for SongplayRecord {
    const TABLE: TableName = TableName::Songplays;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            Field::new("start_time", DataType::Int64, true),
            Field::new("user_id", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("session_id", DataType::Int64, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns = vec![
            int64s(rows, |r| Some(r.songplay_id)),
            int64s(rows, |r| r.start_time),
            strings(rows, |r| r.user_id.as_deref()),
            strings(rows, |r| r.level.as_deref()),
            strings(rows, |r| r.song_id.as_deref()),
            strings(rows, |r| r.artist_id.as_deref()),
            int64s(rows, |r| r.session_id),
            strings(rows, |r| r.location.as_deref()),
            strings(rows, |r| r.user_agent.as_deref()),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}
