//! Time dimension builder
//!
//! Timestamps are interpreted in UTC. `week` is the ISO-8601 week number and
//! `weekday` counts from Sunday = 1 to Saturday = 7.

use crate::error::{Error, Result};
use crate::source::LogEvent;
use crate::warehouse::TimeRecord;
use chrono::{DateTime, Datelike, Timelike};
use rayon::prelude::*;

/// Derive calendar fields from an epoch-millisecond timestamp
pub fn time_record(start_time: i64) -> Result<TimeRecord> {
    let at = DateTime::from_timestamp_millis(start_time).ok_or_else(|| {
        Error::invalid_record(format!("Timestamp {start_time} is out of range"))
    })?;

    Ok(TimeRecord {
        start_time,
        hour: at.hour() as i32,
        day: at.day() as i32,
        week: at.iso_week().week() as i32,
        month: at.month() as i32,
        year: at.year(),
        weekday: at.weekday().number_from_sunday() as i32,
    })
}

/// One time row per play event; duplicates are kept
pub fn build_time_table(events: &[LogEvent]) -> Result<Vec<TimeRecord>> {
    events
        .par_iter()
        .map(|event| {
            let ts = event
                .ts
                .ok_or_else(|| Error::invalid_record("Play event has no ts"))?;
            time_record(ts)
        })
        .collect()
}
