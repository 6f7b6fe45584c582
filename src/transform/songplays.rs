//! Songplay fact builder
//!
//! Broadcast hash join: the song and artist dimensions are indexed once by
//! title and by name, then every play event is looked up in parallel.
//! Matching is exact and case-sensitive.

use crate::error::{Error, Result};
use crate::source::LogEvent;
use crate::warehouse::{ArtistRecord, SongRecord, SongplayRecord};
use rayon::prelude::*;
use std::collections::HashMap;

/// Exact-match index over the song and artist dimensions
///
/// When several rows share a title (or artist name) the first one in catalog
/// order is used. Callers should treat the choice as unspecified.
#[derive(Debug, Default)]
pub struct DimensionLookup<'a> {
    /// Song title -> song_id
    songs_by_title: HashMap<&'a str, Option<&'a str>>,
    /// Artist name -> artist_id
    artists_by_name: HashMap<&'a str, Option<&'a str>>,
}

impl<'a> DimensionLookup<'a> {
    /// Index songs by title and artists by name
    pub fn build(songs: &'a [SongRecord], artists: &'a [ArtistRecord]) -> Self {
        let mut songs_by_title = HashMap::with_capacity(songs.len());
        for song in songs {
            if let Some(title) = song.title.as_deref() {
                songs_by_title
                    .entry(title)
                    .or_insert(song.song_id.as_deref());
            }
        }

        let mut artists_by_name = HashMap::with_capacity(artists.len());
        for artist in artists {
            if let Some(name) = artist.name.as_deref() {
                artists_by_name
                    .entry(name)
                    .or_insert(artist.artist_id.as_deref());
            }
        }

        Self {
            songs_by_title,
            artists_by_name,
        }
    }

    /// song_id for an exact title match
    pub fn song_id(&self, title: &str) -> Option<&'a str> {
        self.songs_by_title.get(title).copied().flatten()
    }

    /// artist_id for an exact name match
    pub fn artist_id(&self, name: &str) -> Option<&'a str> {
        self.artists_by_name.get(name).copied().flatten()
    }

    /// Number of distinct titles indexed
    pub fn song_count(&self) -> usize {
        self.songs_by_title.len()
    }

    /// Number of distinct artist names indexed
    pub fn artist_count(&self) -> usize {
        self.artists_by_name.len()
    }
}

/// One fact row per play event
///
/// `songplay_id` is the event's position in `events`, so ids are dense
/// and follow input order regardless of how work is split across
/// threads.
pub fn build_songplays(
    events: &[LogEvent],
    lookup: &DimensionLookup<'_>,
) -> Result<Vec<SongplayRecord>> {
    events
        .par_iter()
        .enumerate()
        .map(|(index, event)| {
            let songplay_id = i64::try_from(index)
                .map_err(|_| Error::invalid_record(format!("Songplay id {index} overflows i64")))?;

            Ok(SongplayRecord {
                songplay_id,
                start_time: event.ts,
                user_id: event.user_id.clone(),
                level: event.level.clone(),
                song_id: event
                    .song
                    .as_deref()
                    .and_then(|title| lookup.song_id(title))
                    .map(str::to_string),
                artist_id: event
                    .artist
                    .as_deref()
                    .and_then(|name| lookup.artist_id(name))
                    .map(str::to_string),
                session_id: event.session_id,
                location: event.location.clone(),
                user_agent: event.user_agent.clone(),
            })
        })
        .collect()
}
