//! Tests for transform module

use super::*;
use crate::source::{LogEvent, SongCatalogRecord};
use crate::warehouse::{SongRecord, UserRecord};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn catalog(song_id: &str, title: &str, artist_id: &str, artist_name: &str) -> SongCatalogRecord {
    SongCatalogRecord {
        song_id: Some(song_id.to_string()),
        title: Some(title.to_string()),
        artist_id: Some(artist_id.to_string()),
        artist_name: Some(artist_name.to_string()),
        artist_location: Some("Somewhere".to_string()),
        artist_latitude: Some(1.5),
        artist_longitude: Some(-2.5),
        year: Some(2000),
        duration: Some(200.0),
        num_songs: Some(1),
    }
}

fn play(user_id: &str, song: &str, artist: &str, ts: i64) -> LogEvent {
    LogEvent {
        page: Some("NextSong".to_string()),
        user_id: Some(user_id.to_string()),
        song: Some(song.to_string()),
        artist: Some(artist.to_string()),
        ts: Some(ts),
        level: Some("free".to_string()),
        session_id: Some(42),
        location: Some("X".to_string()),
        user_agent: Some("UA".to_string()),
        ..Default::default()
    }
}

fn page_event(page: &str, user_id: &str) -> LogEvent {
    LogEvent {
        page: Some(page.to_string()),
        user_id: Some(user_id.to_string()),
        ts: Some(1_500_000_000_000),
        ..Default::default()
    }
}

// ============================================================================
// Extraction Tests
// ============================================================================

#[test]
fn test_extract_keeps_every_record() {
    let records = vec![
        catalog("S1", "Song A", "AR1", "Artist A"),
        catalog("S2", "Song B", "AR1", "Artist A"),
        catalog("S1", "Song A", "AR1", "Artist A"),
    ];

    let dims = extract_dimensions(&records);
    assert_eq!(dims.songs.len(), 3);
    assert_eq!(dims.artists.len(), 3);
    assert_eq!(dims.songs[0], dims.songs[2]);
    assert_eq!(dims.artists[0], dims.artists[1]);
}

#[test]
fn test_extract_projects_fields() {
    let records = vec![catalog("S1", "Song A", "AR1", "Artist A")];

    let songs = extract_songs(&records);
    assert_eq!(
        songs[0],
        SongRecord {
            song_id: Some("S1".to_string()),
            title: Some("Song A".to_string()),
            artist_id: Some("AR1".to_string()),
            year: Some(2000),
            duration: Some(200.0),
        }
    );

    let artists = extract_artists(&records);
    assert_eq!(artists[0].name.as_deref(), Some("Artist A"));
    assert_eq!(artists[0].location.as_deref(), Some("Somewhere"));
    assert_eq!(artists[0].latitude, Some(1.5));
    assert_eq!(artists[0].longitude, Some(-2.5));
}

// ============================================================================
// Event Filter Tests
// ============================================================================

#[test]
fn test_filter_play_events() {
    let events = vec![
        page_event("Home", "1"),
        page_event("NextSong", "2"),
        page_event("nextsong", "3"),
        LogEvent::default(),
        page_event("NextSong", "4"),
    ];

    let plays = filter_play_events(events);
    let users: Vec<&str> = plays.iter().filter_map(|e| e.user_id.as_deref()).collect();
    assert_eq!(users, vec!["2", "4"]);
}

#[test]
fn test_is_play_event() {
    assert!(is_play_event(&page_event("NextSong", "1")));
    assert!(!is_play_event(&page_event("Logout", "1")));
    assert!(!is_play_event(&LogEvent::default()));
}

// ============================================================================
// Time Dimension Tests
// ============================================================================

// 2017-07-14T02:40:00Z, a Friday in ISO week 28
#[test_case(1_500_000_000_000, 2, 14, 28, 7, 2017, 6 ; "friday in july")]
// 2018-11-01T21:01:46.796Z, a Thursday in ISO week 44
#[test_case(1_541_106_106_796, 21, 1, 44, 11, 2018, 5 ; "thursday in november")]
// 1970-01-01T00:00:00Z, a Thursday in ISO week 1
#[test_case(0, 0, 1, 1, 1, 1970, 5 ; "epoch")]
// 2018-11-04T12:00:00Z, a Sunday in ISO week 44
#[test_case(1_541_332_800_000, 12, 4, 44, 11, 2018, 1 ; "sunday is day one")]
// 2018-11-10T23:59:59Z, a Saturday in ISO week 45
#[test_case(1_541_894_399_000, 23, 10, 45, 11, 2018, 7 ; "saturday is day seven")]
// 2021-01-01T00:00:00Z belongs to ISO week 53 of 2020
#[test_case(1_609_459_200_000, 0, 1, 53, 1, 2021, 6 ; "iso week wraps year")]
fn test_time_record(
    ts: i64,
    hour: i32,
    day: i32,
    week: i32,
    month: i32,
    year: i32,
    weekday: i32,
) {
    let record = time_record(ts).unwrap();
    assert_eq!(record.start_time, ts);
    assert_eq!(record.hour, hour);
    assert_eq!(record.day, day);
    assert_eq!(record.week, week);
    assert_eq!(record.month, month);
    assert_eq!(record.year, year);
    assert_eq!(record.weekday, weekday);
}

#[test]
fn test_time_record_out_of_range() {
    assert!(time_record(i64::MAX).is_err());
}

#[test]
fn test_time_table_keeps_duplicates() {
    let events = vec![
        play("1", "a", "b", 1_500_000_000_000),
        play("2", "a", "b", 1_500_000_000_000),
        play("3", "a", "b", 1_541_106_106_796),
    ];

    let rows = build_time_table(&events).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], rows[1]);
    assert!(rows.iter().all(|r| (0..=23).contains(&r.hour)));
    assert!(rows.iter().all(|r| (1..=7).contains(&r.weekday)));
}

#[test]
fn test_time_table_missing_ts_is_fatal() {
    let mut event = play("1", "a", "b", 0);
    event.ts = None;
    assert!(build_time_table(&[event]).is_err());
}

// ============================================================================
// User Aggregation Tests
// ============================================================================

#[test]
fn test_users_take_lexicographic_minimum() {
    let mut first = page_event("NextSong", "10");
    first.first_name = Some("Sylvie".to_string());
    first.last_name = Some("Cruz".to_string());
    first.gender = Some("F".to_string());
    first.level = Some("paid".to_string());

    let mut second = page_event("NextSong", "10");
    second.first_name = Some("Sylvie".to_string());
    second.last_name = Some("Cruz".to_string());
    second.gender = Some("F".to_string());
    second.level = Some("free".to_string());

    let users = aggregate_users(&[first, second]);
    assert_eq!(
        users,
        vec![UserRecord {
            user_id: Some("10".to_string()),
            first_name: Some("Sylvie".to_string()),
            last_name: Some("Cruz".to_string()),
            gender: Some("F".to_string()),
            level: Some("free".to_string()),
        }]
    );
}

#[test]
fn test_users_minimum_is_per_field() {
    let mut a = page_event("NextSong", "7");
    a.first_name = Some("Bob".to_string());
    a.last_name = Some("Zeta".to_string());

    let mut b = page_event("NextSong", "7");
    b.first_name = Some("Carl".to_string());
    b.last_name = Some("Alpha".to_string());

    let users = aggregate_users(&[a, b]);
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].first_name.as_deref(), Some("Bob"));
    assert_eq!(users[0].last_name.as_deref(), Some("Alpha"));
}

#[test]
fn test_users_ignore_nulls_and_compare_case_sensitively() {
    let mut a = page_event("NextSong", "7");
    a.level = None;
    a.first_name = Some("anna".to_string());

    let mut b = page_event("NextSong", "7");
    b.level = Some("paid".to_string());
    b.first_name = Some("Zoe".to_string());

    let users = aggregate_users(&[a, b]);
    assert_eq!(users[0].level.as_deref(), Some("paid"));
    // Uppercase sorts before lowercase
    assert_eq!(users[0].first_name.as_deref(), Some("Zoe"));
}

#[test]
fn test_users_one_row_per_distinct_id() {
    let events: Vec<LogEvent> = (0..1000)
        .map(|i| page_event("NextSong", &format!("{}", i % 37)))
        .collect();

    let users = aggregate_users(&events);
    assert_eq!(users.len(), 37);

    let mut ids: Vec<_> = users.iter().map(|u| u.user_id.clone()).collect();
    let sorted = ids.clone();
    ids.dedup();
    assert_eq!(ids, sorted);
}

#[test]
fn test_users_missing_id_groups_together() {
    let mut a = page_event("NextSong", "1");
    a.user_id = None;
    let mut b = page_event("NextSong", "1");
    b.user_id = None;

    let users = aggregate_users(&[a, b, page_event("NextSong", "2")]);
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].user_id, None);
    assert_eq!(users[1].user_id.as_deref(), Some("2"));
}

// ============================================================================
// Songplay Tests
// ============================================================================

#[test]
fn test_songplay_full_match() {
    let dims = extract_dimensions(&[catalog("S1", "Song A", "AR1", "Artist A")]);
    let lookup = dims.lookup();

    let events = vec![play("U1", "Song A", "Artist A", 1_500_000_000_000)];
    let rows = build_songplays(&events, &lookup).unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.song_id.as_deref(), Some("S1"));
    assert_eq!(row.artist_id.as_deref(), Some("AR1"));
    assert_eq!(row.user_id.as_deref(), Some("U1"));
    assert_eq!(row.level.as_deref(), Some("free"));
    assert_eq!(row.session_id, Some(42));
    assert_eq!(row.start_time, Some(1_500_000_000_000));
    assert_eq!(row.location.as_deref(), Some("X"));
    assert_eq!(row.user_agent.as_deref(), Some("UA"));
}

#[test]
fn test_songplay_unknown_artist() {
    let dims = extract_dimensions(&[catalog("S1", "Song A", "AR1", "Artist A")]);
    let lookup = dims.lookup();

    let events = vec![play("U1", "Song A", "Unknown Artist", 1_500_000_000_000)];
    let rows = build_songplays(&events, &lookup).unwrap();

    assert_eq!(rows[0].song_id.as_deref(), Some("S1"));
    assert_eq!(rows[0].artist_id, None);
}

#[test]
fn test_songplay_match_is_case_sensitive() {
    let dims = extract_dimensions(&[catalog("S1", "Song A", "AR1", "Artist A")]);
    let lookup = dims.lookup();

    let events = vec![play("U1", "song a", "ARTIST A", 0)];
    let rows = build_songplays(&events, &lookup).unwrap();

    assert_eq!(rows[0].song_id, None);
    assert_eq!(rows[0].artist_id, None);
}

#[test]
fn test_songplay_null_song_never_matches() {
    let dims = extract_dimensions(&[catalog("S1", "Song A", "AR1", "Artist A")]);
    let lookup = dims.lookup();

    let mut event = play("U1", "Song A", "Artist A", 0);
    event.song = None;
    event.artist = None;
    let rows = build_songplays(&[event], &lookup).unwrap();

    assert_eq!(rows[0].song_id, None);
    assert_eq!(rows[0].artist_id, None);
}

#[test]
fn test_songplay_cardinality_and_ids() {
    let dims = extract_dimensions(&[
        catalog("S1", "Song A", "AR1", "Artist A"),
        catalog("S2", "Song A", "AR2", "Artist A"),
    ]);
    let lookup = dims.lookup();
    assert_eq!(lookup.song_count(), 1);
    assert_eq!(lookup.artist_count(), 1);

    let events: Vec<LogEvent> = (0..500)
        .map(|i| play(&format!("U{}", i % 5), "Song A", "Artist A", i))
        .collect();
    let rows = build_songplays(&events, &lookup).unwrap();

    // Duplicate titles do not multiply fact rows
    assert_eq!(rows.len(), 500);
    let ids: Vec<i64> = rows.iter().map(|r| r.songplay_id).collect();
    let expected: Vec<i64> = (0..500).collect();
    assert_eq!(ids, expected);
    assert!(rows.iter().all(|r| r.song_id.is_some()));
}

#[test]
fn test_lookup_skips_rows_without_keys() {
    let songs = vec![SongRecord {
        song_id: Some("S9".to_string()),
        ..Default::default()
    }];
    let lookup = DimensionLookup::build(&songs, &[]);
    assert_eq!(lookup.song_count(), 0);
    assert_eq!(lookup.song_id(""), None);
}
