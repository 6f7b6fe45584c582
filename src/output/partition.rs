//! Hive-style partition splitting
//!
//! A batch is split into one slice per distinct combination of partition
//! column values. Each slice carries its relative directory
//! (`year=2018/month=11`) and the remaining, non-partition columns.

use crate::error::{Error, Result};
use arrow::array::{Array, UInt32Array};
use arrow::compute::take_record_batch;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Directory name used for null or empty partition values
pub const DEFAULT_PARTITION_NAME: &str = "__HIVE_DEFAULT_PARTITION__";

/// Rows of one partition
#[derive(Debug, Clone)]
pub struct PartitionSlice {
    /// Relative directory, empty for unpartitioned tables
    pub path: String,
    /// Rows without the partition columns
    pub batch: RecordBatch,
}

/// Split a batch by the values of `columns`
///
/// Slices come back sorted by their partition values. An empty batch yields
/// no slices; an empty `columns` list yields one slice with an empty path.
pub fn partition_batch(batch: &RecordBatch, columns: &[&str]) -> Result<Vec<PartitionSlice>> {
    if batch.num_rows() == 0 {
        return Ok(Vec::new());
    }

    if columns.is_empty() {
        return Ok(vec![PartitionSlice {
            path: String::new(),
            batch: batch.clone(),
        }]);
    }

    let schema = batch.schema();
    let mut key_indices = Vec::with_capacity(columns.len());
    for column in columns {
        let index = schema
            .index_of(column)
            .map_err(|_| Error::output(format!("Unknown partition column '{column}'")))?;
        key_indices.push(index);
    }

    let options = FormatOptions::default();
    let formatters = key_indices
        .iter()
        .map(|&i| ArrayFormatter::try_new(batch.column(i).as_ref(), &options))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut groups: BTreeMap<Vec<Option<String>>, Vec<u32>> = BTreeMap::new();
    for row in 0..batch.num_rows() {
        let key = key_indices
            .iter()
            .zip(&formatters)
            .map(|(&col, formatter)| {
                if batch.column(col).is_null(row) {
                    return None;
                }
                let value = formatter.value(row).to_string();
                (!value.is_empty()).then_some(value)
            })
            .collect();
        let row = u32::try_from(row)
            .map_err(|_| Error::output("Batch too large to partition".to_string()))?;
        groups.entry(key).or_default().push(row);
    }

    let data_indices: Vec<usize> = (0..schema.fields().len())
        .filter(|i| !key_indices.contains(i))
        .collect();
    let data = batch.project(&data_indices)?;

    let mut slices = Vec::with_capacity(groups.len());
    for (values, rows) in groups {
        let path = columns
            .iter()
            .zip(&values)
            .map(|(column, value)| format!("{column}={}", partition_value(value.as_deref())))
            .collect::<Vec<_>>()
            .join("/");
        let batch = take_record_batch(&data, &UInt32Array::from(rows))?;
        slices.push(PartitionSlice { path, batch });
    }

    Ok(slices)
}

/// Render one partition value as a directory name component
pub fn partition_value(value: Option<&str>) -> String {
    match value {
        None | Some("") => DEFAULT_PARTITION_NAME.to_string(),
        Some(v) => escape_path_name(v),
    }
}

fn escape_path_name(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if needs_escape(ch) {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{byte:02X}");
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn needs_escape(ch: char) -> bool {
    ch.is_control()
        || matches!(
            ch,
            '/' | '\\' | '=' | '%' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '#'
        )
}
