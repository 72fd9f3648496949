use chrono::{DateTime, FixedOffset};
use geo::{point, Point};

/// A single recorded position of a track.
///
/// Points are never edited in place: the track store only removes and
/// re-inserts whole values.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: f64,
    pub time: Option<DateTime<FixedOffset>>,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        TrackPoint {
            lat,
            lon,
            ele: 0.0,
            time: None,
        }
    }

    pub fn with_elevation(mut self, ele: f64) -> Self {
        self.ele = ele;
        self
    }

    pub fn with_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.time = Some(time);
        self
    }

    /// True when both coordinates are finite and inside the WGS84 ranges.
    pub fn has_valid_coordinates(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Elevation as the stats engine reads it: non-finite values count as 0 m.
    pub fn elevation_or_zero(&self) -> f64 {
        if self.ele.is_finite() {
            self.ele
        } else {
            0.0
        }
    }

    pub fn geo_point(&self) -> Point<f64> {
        point!(x: self.lon, y: self.lat)
    }
}
