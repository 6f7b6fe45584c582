//! Warehouse row types

use serde::{Deserialize, Serialize};

/// Song dimension row
///
/// One per catalog record; `song_id` is not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<i64>,
    pub duration: Option<f64>,
}

/// Artist dimension row
///
/// One per catalog record; the same artist appears once per song.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub artist_id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Time dimension row derived from one play event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRecord {
    /// Original event timestamp in epoch milliseconds
    pub start_time: i64,
    /// Hour of day, 0-23
    pub hour: i32,
    /// Day of month, 1-31
    pub day: i32,
    /// ISO-8601 week of year, 1-53
    pub week: i32,
    /// Month, 1-12
    pub month: i32,
    pub year: i32,
    /// Day of week, 1 = Sunday through 7 = Saturday
    pub weekday: i32,
}

/// User dimension row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

/// Song-play fact row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongplayRecord {
    /// Synthetic id, unique within a run
    pub songplay_id: i64,
    pub start_time: Option<i64>,
    pub user_id: Option<String>,
    pub level: Option<String>,
    /// Null unless the event's song title matched the catalog
    pub song_id: Option<String>,
    /// Null unless the event's artist name matched the catalog
    pub artist_id: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}
