//! Song and artist extraction
//!
//! Every catalog record yields exactly one song row and one artist row.

use super::songplays::DimensionLookup;
use crate::source::SongCatalogRecord;
use crate::warehouse::{ArtistRecord, SongRecord};
use rayon::prelude::*;
use std::sync::Arc;

/// Song and artist dimensions held in memory for the fact builder
///
/// Rows are shared, so cloning is cheap and a clone can be moved onto the
/// blocking pool.
#[derive(Debug, Clone)]
pub struct Dimensions {
    /// Song rows in catalog order
    pub songs: Arc<[SongRecord]>,
    /// Artist rows in catalog order
    pub artists: Arc<[ArtistRecord]>,
}

impl Dimensions {
    /// Build the title/name lookup over these dimensions
    pub fn lookup(&self) -> DimensionLookup<'_> {
        DimensionLookup::build(&self.songs, &self.artists)
    }
}

/// Project catalog records onto song rows
pub fn extract_songs(records: &[SongCatalogRecord]) -> Vec<SongRecord> {
    records
        .par_iter()
        .map(|r| SongRecord {
            song_id: r.song_id.clone(),
            title: r.title.clone(),
            artist_id: r.artist_id.clone(),
            year: r.year,
            duration: r.duration,
        })
        .collect()
}

/// Project catalog records onto artist rows
pub fn extract_artists(records: &[SongCatalogRecord]) -> Vec<ArtistRecord> {
    records
        .par_iter()
        .map(|r| ArtistRecord {
            artist_id: r.artist_id.clone(),
            name: r.artist_name.clone(),
            location: r.artist_location.clone(),
            latitude: r.artist_latitude,
            longitude: r.artist_longitude,
        })
        .collect()
}

/// Extract both dimensions from the catalog
pub fn extract_dimensions(records: &[SongCatalogRecord]) -> Dimensions {
    let (songs, artists) = rayon::join(|| extract_songs(records), || extract_artists(records));
    Dimensions {
        songs: songs.into(),
        artists: artists.into(),
    }
}
