//! Per-point profile export as CSV.

use std::path::Path;

use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::error::TrackIoError;
use crate::point::TrackPoint;
use crate::stats::StatsSnapshot;

#[derive(Debug, Serialize)]
struct ProfileRow {
    index: usize,
    time: String,
    lat: f64,
    lon: f64,
    ele_m: f64,
    distance_km: f64,
}

/// One row per point with its cumulative distance.
///
/// `snapshot` must have been computed from `points`.
pub fn export_profile_csv(
    points: &[TrackPoint],
    snapshot: &StatsSnapshot,
    output_path: &Path,
) -> Result<(), TrackIoError> {
    let mut wtr = Writer::from_path(output_path)?;

    for (index, p) in points.iter().enumerate() {
        wtr.serialize(ProfileRow {
            index,
            time: p.time.map(|t| t.to_rfc3339()).unwrap_or_default(),
            lat: p.lat,
            lon: p.lon,
            ele_m: p.ele,
            distance_km: snapshot.cumulative_distance_km.get(index).copied().unwrap_or(0.0),
        })?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    info!("Exported {} profile rows to {}", points.len(), output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{compute_stats, StatsParams};

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.csv");
        let points = vec![
            TrackPoint::new(35.0, 139.0).with_elevation(10.0),
            TrackPoint::new(35.0, 139.01).with_elevation(20.0),
        ];
        let stats = compute_stats(&points, &StatsParams::default());
        export_profile_csv(&points, &stats, &path).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["index", "time", "lat", "lon", "ele_m", "distance_km"]
        );
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[0][1], "");
        assert_eq!(&rows[1][4], "20.0");
    }
}
