//! Transformation stages
//!
//! Pure functions from raw source records to warehouse rows.
//!
//! # Overview
//!
//! - `extract` - Song/artist projection of the catalog (no dedup)
//! - `events` - Play-event filter (`page == "NextSong"`)
//! - `time` - Calendar fields from epoch-millisecond timestamps
//! - `users` - One row per user id, lexicographic minimum per field
//! - `songplays` - Play events joined to the song/artist dimensions
//!
//! Stages run data-parallel on the rayon pool. Output order follows input
//! order except for `users`, which is sorted by user id.

mod events;
mod extract;
mod songplays;
mod time;
mod users;

pub use events::{filter_play_events, is_play_event};
pub use extract::{extract_artists, extract_dimensions, extract_songs, Dimensions};
pub use songplays::{build_songplays, DimensionLookup};
pub use time::{build_time_table, time_record};
pub use users::aggregate_users;

#[cfg(test)]
mod tests;
