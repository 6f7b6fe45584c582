//! Warehouse data model
//!
//! Row types of the five output tables and their Arrow representation.
//!
//! # Overview
//!
//! | Table | Row type | Partitioned by |
//! |---|---|---|
//! | `songs_table` | `SongRecord` | year, artist_id |
//! | `artists_table` | `ArtistRecord` | - |
//! | `users_table` | `UserRecord` | - |
//! | `time_table` | `TimeRecord` | year, month |
//! | `songplays_table` | `SongplayRecord` | user_id |

mod schema;
mod types;

pub use schema::WarehouseTable;
pub use types::{ArtistRecord, SongRecord, SongplayRecord, TimeRecord, UserRecord};
