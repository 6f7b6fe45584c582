//! Common types used throughout the warehouse loader
//!
//! This module contains shared constants and the catalog of output tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page value that marks a song-play event in the event log
pub const PLAY_EVENT_PAGE: &str = "NextSong";

// ============================================================================
// Table Names
// ============================================================================

/// Output tables of the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableName {
    /// Song dimension
    #[serde(rename = "songs_table")]
    Songs,
    /// Artist dimension
    #[serde(rename = "artists_table")]
    Artists,
    /// User dimension
    #[serde(rename = "users_table")]
    Users,
    /// Time dimension
    #[serde(rename = "time_table")]
    Time,
    /// Song-play fact table
    #[serde(rename = "songplays_table")]
    Songplays,
}

impl TableName {
    /// All tables in the order the pipeline writes them
    pub const ALL: [TableName; 5] = [
        TableName::Songs,
        TableName::Artists,
        TableName::Users,
        TableName::Time,
        TableName::Songplays,
    ];

    /// Directory name of the table under the destination root
    pub fn as_str(self) -> &'static str {
        match self {
            TableName::Songs => "songs_table",
            TableName::Artists => "artists_table",
            TableName::Users => "users_table",
            TableName::Time => "time_table",
            TableName::Songplays => "songplays_table",
        }
    }

    /// Columns the table is partitioned by, outermost first
    pub fn partition_columns(self) -> &'static [&'static str] {
        match self {
            TableName::Songs => &["year", "artist_id"],
            TableName::Time => &["year", "month"],
            TableName::Songplays => &["user_id"],
            TableName::Artists | TableName::Users => &[],
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
