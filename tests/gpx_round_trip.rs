use std::fs;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use gpx_track_editor::gpx_io::{load_track, save_track, DEFAULT_TRACK_NAME};
use gpx_track_editor::{compute_stats, StatsParams, TrackIoError, TrackPoint};

const TWO_SEGMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="35.0000" lon="139.0000"><ele>10.0</ele><time>2024-05-01T00:00:00Z</time></trkpt>
      <trkpt lat="35.0010" lon="139.0000"><ele>12.0</ele><time>2024-05-01T00:10:00Z</time></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="35.0020" lon="139.0000"><time>2024-05-01T00:20:00Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>
"#;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

fn write_fixture(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_segments_flatten_and_name_falls_back_to_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "morning_ride.gpx", TWO_SEGMENTS);

    let loaded = load_track(&path, utc()).unwrap();
    assert_eq!(loaded.name, "morning_ride");
    assert_eq!(loaded.points.len(), 3);
    assert_eq!(loaded.points[2].ele, 0.0);
    assert_eq!(loaded.points[1].lat, 35.001);

    let stats = compute_stats(&loaded.points, &StatsParams::default());
    assert_eq!(stats.total_time_seconds, 1200.0);
    assert_eq!(stats.formatted_time(), "00:20");
}

#[test]
fn test_times_shift_into_display_offset() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "t.gpx", TWO_SEGMENTS);

    let loaded = load_track(&path, jst()).unwrap();
    let first = loaded.points[0].time.unwrap();
    assert_eq!(first.to_rfc3339(), "2024-05-01T09:00:00+09:00");
    assert_eq!(first.offset(), &jst());
}

#[test]
fn test_save_then_load_keeps_points_and_instants() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.gpx");
    let t0 = DateTime::parse_from_rfc3339("2024-05-01T09:00:00+09:00").unwrap();
    let t1 = DateTime::parse_from_rfc3339("2024-05-01T09:00:30+09:00").unwrap();
    let points = vec![
        TrackPoint::new(35.5, 139.25).with_elevation(120.5).with_time(t0),
        TrackPoint::new(35.5005, 139.2505).with_elevation(121.0).with_time(t1),
        TrackPoint::new(35.501, 139.251).with_elevation(119.0),
    ];

    save_track(&points, &path, "Lunch loop").unwrap();
    let loaded = load_track(&path, jst()).unwrap();

    assert_eq!(loaded.name, "Lunch loop");
    assert_eq!(loaded.points.len(), 3);
    for (saved, read) in points.iter().zip(&loaded.points) {
        assert!((saved.lat - read.lat).abs() < 1e-9);
        assert!((saved.lon - read.lon).abs() < 1e-9);
        assert!((saved.ele - read.ele).abs() < 1e-9);
        assert_eq!(saved.time, read.time);
    }
}

#[test]
fn test_blank_name_saves_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unnamed.gpx");
    save_track(&[TrackPoint::new(1.0, 2.0)], &path, "   ").unwrap();

    let loaded = load_track(&path, utc()).unwrap();
    assert_eq!(loaded.name, DEFAULT_TRACK_NAME);
}

#[test]
fn test_load_errors_carry_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.gpx");
    match load_track(&missing, utc()) {
        Err(TrackIoError::Read { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected read error, got {:?}", other),
    }

    let garbage = write_fixture(dir.path(), "bad.gpx", "not xml at all");
    assert!(matches!(
        load_track(&garbage, utc()),
        Err(TrackIoError::Parse { .. })
    ));
}
