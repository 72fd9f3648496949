//! GPX track source and sink.
//!
//! Files store UTC; the editor works in one display offset. Reading converts
//! UTC into that offset and writing converts back, so the editing core never
//! deals with zones.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use gpx::{read, write, Gpx, GpxVersion, Metadata, Time, Track, TrackSegment, Waypoint};
use time::OffsetDateTime;
use tracing::info;

use crate::error::TrackIoError;
use crate::point::TrackPoint;

pub const DEFAULT_TRACK_NAME: &str = "GPX Track";

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrack {
    pub points: Vec<TrackPoint>,
    pub name: String,
}

/// Read every track and segment of a GPX file into one flat point list.
pub fn load_track(path: &Path, display_offset: FixedOffset) -> Result<LoadedTrack, TrackIoError> {
    let file = File::open(path).map_err(|source| TrackIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let gpx = read(BufReader::new(file)).map_err(|source| TrackIoError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut points = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for wpt in &segment.points {
                let index = points.len();
                let time = match &wpt.time {
                    Some(t) => Some(
                        from_gpx_time(t, display_offset).ok_or(TrackIoError::Timestamp { index })?,
                    ),
                    None => None,
                };
                let p = wpt.point();
                points.push(TrackPoint {
                    lat: p.y(),
                    lon: p.x(),
                    ele: wpt.elevation.unwrap_or(0.0),
                    time,
                });
            }
        }
    }

    let name = track_name(&gpx, path);
    info!("Loaded {} points from {} ({})", points.len(), path.display(), name);
    Ok(LoadedTrack { points, name })
}

/// Write the points as a single track with a single segment.
pub fn save_track(points: &[TrackPoint], path: &Path, track_name: &str) -> Result<(), TrackIoError> {
    let name = match track_name.trim() {
        "" => DEFAULT_TRACK_NAME.to_string(),
        trimmed => trimmed.to_string(),
    };

    let mut segment = TrackSegment::new();
    for (index, p) in points.iter().enumerate() {
        let mut waypoint = Waypoint::new(p.geo_point());
        waypoint.elevation = Some(p.ele);
        if let Some(t) = p.time {
            waypoint.time = Some(to_gpx_time(t).ok_or(TrackIoError::Timestamp { index })?);
        }
        segment.points.push(waypoint);
    }

    let mut track = Track::new();
    track.name = Some(name.clone());
    track.segments.push(segment);

    let mut metadata = Metadata::default();
    metadata.name = Some(name.clone());

    let mut gpx = Gpx::default();
    gpx.version = GpxVersion::Gpx11;
    gpx.creator = Some(env!("CARGO_PKG_NAME").to_string());
    gpx.metadata = Some(metadata);
    gpx.tracks.push(track);

    let file = File::create(path).map_err(|source| TrackIoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write(&gpx, BufWriter::new(file)).map_err(|source| TrackIoError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Saved {} points to {} ({})", points.len(), path.display(), name);
    Ok(())
}

/// Append `.gpx` unless the path already ends with it (any case).
pub fn ensure_gpx_extension(path: &Path) -> PathBuf {
    let has_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("gpx"))
        .unwrap_or(false);
    if has_ext {
        path.to_path_buf()
    } else {
        path.with_extension("gpx")
    }
}

fn track_name(gpx: &Gpx, path: &Path) -> String {
    gpx.metadata
        .as_ref()
        .and_then(|m| m.name.clone())
        .filter(|n| !n.trim().is_empty())
        .or_else(|| gpx.tracks.first().and_then(|t| t.name.clone()))
        .filter(|n| !n.trim().is_empty())
        .or_else(|| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_TRACK_NAME.to_string())
}

fn from_gpx_time(t: &Time, display_offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let odt: OffsetDateTime = t.clone().into();
    DateTime::<Utc>::from_timestamp(odt.unix_timestamp(), odt.nanosecond())
        .map(|utc| utc.with_timezone(&display_offset))
}

fn to_gpx_time(t: DateTime<FixedOffset>) -> Option<Time> {
    let nanos = i128::from(t.timestamp()) * 1_000_000_000 + i128::from(t.timestamp_subsec_nanos());
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok().map(Time::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_gpx_extension() {
        assert_eq!(ensure_gpx_extension(Path::new("a/track")), PathBuf::from("a/track.gpx"));
        assert_eq!(ensure_gpx_extension(Path::new("track.GPX")), PathBuf::from("track.GPX"));
        assert_eq!(ensure_gpx_extension(Path::new("track.txt")), PathBuf::from("track.gpx"));
    }

    #[test]
    fn test_time_conversion_keeps_instant() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let t = DateTime::parse_from_rfc3339("2024-05-01T08:30:15.250+09:00").unwrap();
        let back = from_gpx_time(&to_gpx_time(t).unwrap(), jst).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.offset(), &jst);
        assert_eq!(back.to_rfc3339(), "2024-05-01T08:30:15.250+09:00");
    }
}
