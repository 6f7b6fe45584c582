//! Tests for pipeline module

use super::*;
use crate::output::Destination;
use crate::source::SourceLocation;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn write_fixture(root: &Path) {
    write_file(
        root,
        "song_data/A/A/A/TRAAAAW128F429D538.json",
        r#"{"num_songs": 1, "artist_id": "AR1", "artist_latitude": null, "artist_longitude": null, "artist_location": "LA", "artist_name": "Casual", "song_id": "S1", "title": "Intro", "duration": 218.9, "year": 2001}"#,
    );
    write_file(
        root,
        "song_data/A/A/B/TRAABJL12903CDCF1A.json",
        r#"{"num_songs": 1, "artist_id": "AR2", "artist_latitude": 35.1, "artist_longitude": -90.0, "artist_location": "", "artist_name": "Line", "song_id": "S2", "title": "Outro", "duration": 152.9, "year": 0}"#,
    );
    write_file(
        root,
        "log_data/2018/11/2018-11-01-events.json",
        concat!(
            r#"{"artist": null, "auth": "Logged In", "firstName": "Walter", "gender": "M", "itemInSession": 0, "lastName": "Frye", "length": null, "level": "free", "location": "SF", "method": "GET", "page": "Home", "registration": 1540919166796.0, "sessionId": 38, "song": null, "status": 200, "ts": 1541105830796, "userAgent": "UA", "userId": "39"}"#,
            "\n",
            r#"{"artist": "Casual", "auth": "Logged In", "firstName": "Kaylee", "gender": "F", "itemInSession": 1, "lastName": "Summers", "length": 218.9, "level": "free", "location": "Phoenix", "method": "PUT", "page": "NextSong", "registration": 1540344794796.0, "sessionId": 139, "song": "Intro", "status": 200, "ts": 1541106106796, "userAgent": "UA", "userId": "8"}"#,
            "\n",
            r#"{"artist": "Nobody", "auth": "Logged In", "firstName": "Kaylee", "gender": "F", "itemInSession": 2, "lastName": "Summers", "length": 100.0, "level": "paid", "location": "Phoenix", "method": "PUT", "page": "NextSong", "registration": 1540344794796.0, "sessionId": 139, "song": "Outro", "status": 200, "ts": 1541106352796, "userAgent": "UA", "userId": "8"}"#,
            "\n"
        ),
    );
}

fn memory_pipeline(root: &Path) -> Pipeline<Destination> {
    let config = PipelineConfig::new(root.to_str().unwrap(), "memory://");
    Pipeline::with_sink(config, Destination::in_memory()).unwrap()
}

#[tokio::test]
async fn test_run_writes_all_tables_in_order() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let pipeline = memory_pipeline(dir.path());

    let summary = pipeline.run().await.unwrap();

    let tables: Vec<&str> = summary.tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(
        tables,
        vec![
            "songs_table",
            "artists_table",
            "users_table",
            "time_table",
            "songplays_table"
        ]
    );
    assert_eq!(summary.catalog_records, 2);
    assert_eq!(summary.events_read, 3);
    assert_eq!(summary.play_events, 2);
    assert_eq!(summary.rows_written("songs_table"), Some(2));
    assert_eq!(summary.rows_written("artists_table"), Some(2));
    assert_eq!(summary.rows_written("users_table"), Some(1));
    assert_eq!(summary.rows_written("time_table"), Some(2));
    assert_eq!(summary.rows_written("songplays_table"), Some(2));
    assert_eq!(summary.total_rows(), 9);
}

#[tokio::test]
async fn test_run_counts_join_matches() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let pipeline = memory_pipeline(dir.path());

    let summary = pipeline.run().await.unwrap();

    // "Intro" by "Casual" matches both; "Outro" matches a song but "Nobody" no artist
    assert_eq!(summary.matched_songs, 2);
    assert_eq!(summary.matched_artists, 1);
}

#[tokio::test]
async fn test_process_song_data_returns_dimensions() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let pipeline = memory_pipeline(dir.path());
    let mut summary = RunSummary::new();

    let dimensions = pipeline.process_song_data(&mut summary).await.unwrap();

    assert_eq!(dimensions.songs.len(), 2);
    assert_eq!(dimensions.artists.len(), 2);
    assert_eq!(summary.tables.len(), 2);

    let files = pipeline.writer().sink().list("songs_table").await.unwrap();
    assert_eq!(
        files,
        vec![
            "songs_table/_SUCCESS",
            "songs_table/year=0/artist_id=AR2/part-00000.parquet",
            "songs_table/year=2001/artist_id=AR1/part-00000.parquet",
        ]
    );
}

#[tokio::test]
async fn test_run_is_repeatable() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let pipeline = memory_pipeline(dir.path());

    let first = pipeline.run().await.unwrap();
    let before = pipeline.writer().sink().list("").await.unwrap();
    let second = pipeline.run().await.unwrap();
    let after = pipeline.writer().sink().list("").await.unwrap();

    assert_eq!(before, after);
    assert_eq!(first.total_rows(), second.total_rows());
    assert!(second.tables.iter().all(|t| t.files_removed > 0));
}

#[tokio::test]
async fn test_missing_input_fails_before_writing() {
    let dir = tempdir().unwrap();
    let pipeline = memory_pipeline(&dir.path().join("missing"));

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, Error::SourceNotFound { .. }));
    assert!(pipeline.writer().sink().list("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_events_keep_dimension_tables() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    write_file(dir.path(), "log_data/2018/11/2018-11-02-events.json", "{not json\n");
    let pipeline = memory_pipeline(dir.path());

    let err = pipeline.run().await.unwrap_err();
    assert!(err.is_source_error());

    // Catalog tables were written before the event log failed
    let sink = pipeline.writer().sink();
    assert!(!sink.list("songs_table").await.unwrap().is_empty());
    assert!(!sink.list("artists_table").await.unwrap().is_empty());
    assert!(sink.list("users_table").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_reads_object_store_source() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    // Mirror the local fixture into a store, keys relative to the input root
    let store = Destination::in_memory();
    for relative in [
        "song_data/A/A/A/TRAAAAW128F429D538.json",
        "song_data/A/A/B/TRAABJL12903CDCF1A.json",
        "log_data/2018/11/2018-11-01-events.json",
    ] {
        let contents = fs::read(dir.path().join(relative)).unwrap();
        store.put(relative, Bytes::from(contents)).await.unwrap();
    }

    let local = memory_pipeline(dir.path()).run().await.unwrap();
    let remote = memory_pipeline(Path::new("unused"))
        .with_source(SourceLocation::ObjectStore(store))
        .run()
        .await
        .unwrap();

    assert_eq!(remote.catalog_records, local.catalog_records);
    assert_eq!(remote.events_read, local.events_read);
    assert_eq!(remote.matched_songs, local.matched_songs);
    assert_eq!(remote.matched_artists, local.matched_artists);
    assert_eq!(remote.tables, local.tables);
}

#[tokio::test]
async fn test_object_store_source_without_catalog_fails() {
    let pipeline = memory_pipeline(Path::new("unused"))
        .with_source(SourceLocation::ObjectStore(Destination::in_memory()));

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, Error::SourceNotFound { .. }));
    assert!(pipeline.writer().sink().list("").await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_on_multi_thread_runtime() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let pipeline = memory_pipeline(dir.path());

    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.tables.len(), 5);
    assert_eq!(summary.total_rows(), 9);
    assert_eq!(summary.matched_songs, 2);
}

#[test]
fn test_from_config_rejects_invalid_config() {
    let err = Pipeline::from_config(PipelineConfig::default()).err().unwrap();
    assert!(matches!(err, Error::MissingConfigField { .. }));
}

#[test]
fn test_summary_serializes() {
    let summary = RunSummary {
        catalog_records: 3,
        ..Default::default()
    };
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["catalog_records"], 3);
    assert!(json["tables"].as_array().unwrap().is_empty());
}
