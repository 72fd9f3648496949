//! Derived track statistics: elapsed time, 2D distance and smoothed ascent.

use chrono::{DateTime, FixedOffset};

use crate::geometry::{distance_2d, smooth_elevations};
use crate::point::TrackPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsParams {
    pub smoothing_window: usize,
    /// Smoothed per-step gain must be strictly greater than this to count.
    pub ascent_threshold_m: f64,
}

impl Default for StatsParams {
    fn default() -> Self {
        StatsParams {
            smoothing_window: 5,
            ascent_threshold_m: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsSnapshot {
    pub total_time_seconds: f64,
    pub total_distance_km: f64,
    pub total_ascent_m: f64,
    /// Running 2D distance in km, one entry per track point.
    pub cumulative_distance_km: Vec<f64>,
    /// Raw elevations in m, one entry per track point.
    pub elevations_m: Vec<f64>,
    pub times: Vec<Option<DateTime<FixedOffset>>>,
}

/// What the profile shows for a highlighted point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointInfo {
    pub index: usize,
    pub distance_km: f64,
    pub elevation_m: f64,
    pub time: Option<DateTime<FixedOffset>>,
}

impl StatsSnapshot {
    pub fn point_info(&self, index: usize) -> Option<PointInfo> {
        let distance_km = *self.cumulative_distance_km.get(index)?;
        let elevation_m = *self.elevations_m.get(index)?;
        Some(PointInfo {
            index,
            distance_km,
            elevation_m,
            time: self.times.get(index).copied().flatten(),
        })
    }

    /// Total time as `HH:MM`, or `-` for a track without elapsed time.
    pub fn formatted_time(&self) -> String {
        format_duration(self.total_time_seconds)
    }

    pub fn summary(&self) -> String {
        format!(
            "Time: {}  Distance: {:.2} km  Ascent: {:.0} m",
            self.formatted_time(),
            self.total_distance_km,
            self.total_ascent_m
        )
    }
}

impl PointInfo {
    pub fn describe(&self) -> String {
        let time_str = self
            .time
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());
        format!(
            "{} - distance: {:.2} km / elevation: {:.1} m",
            time_str, self.distance_km, self.elevation_m
        )
    }
}

pub fn format_duration(total_seconds: f64) -> String {
    if !(total_seconds > 0.0) {
        return "-".to_string();
    }
    let hours = (total_seconds / 3600.0).floor() as u64;
    let minutes = ((total_seconds % 3600.0) / 60.0).floor() as u64;
    format!("{:02}:{:02}", hours, minutes)
}

pub fn compute_stats(points: &[TrackPoint], params: &StatsParams) -> StatsSnapshot {
    if points.is_empty() {
        return StatsSnapshot::default();
    }

    // Points without usable coordinates enter the profile at 0 m.
    let raw_elevations: Vec<f64> = points
        .iter()
        .map(|p| {
            if p.has_valid_coordinates() {
                p.elevation_or_zero()
            } else {
                0.0
            }
        })
        .collect();
    let smoothed = smooth_elevations(&raw_elevations, params.smoothing_window);

    let mut cumulative_distance_km = Vec::with_capacity(points.len());
    cumulative_distance_km.push(0.0);
    let mut distance_m = 0.0;
    let mut ascent_m = 0.0;

    for (i, pair) in points.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        // An invalid endpoint contributes neither distance nor ascent.
        if a.has_valid_coordinates() && b.has_valid_coordinates() {
            distance_m += distance_2d(a, b);
            let delta = smoothed[i + 1] - smoothed[i];
            if delta > params.ascent_threshold_m {
                ascent_m += delta;
            }
        }
        cumulative_distance_km.push(distance_m / 1000.0);
    }

    StatsSnapshot {
        total_time_seconds: elapsed_seconds(points),
        total_distance_km: distance_m / 1000.0,
        total_ascent_m: ascent_m,
        cumulative_distance_km,
        elevations_m: raw_elevations,
        times: points.iter().map(|p| p.time).collect(),
    }
}

/// Seconds between the first and last timestamped points with valid
/// coordinates, in track order.
fn elapsed_seconds(points: &[TrackPoint]) -> f64 {
    let mut stamped = points
        .iter()
        .filter(|p| p.has_valid_coordinates())
        .filter_map(|p| p.time);
    let Some(first) = stamped.next() else {
        return 0.0;
    };
    let Some(last) = stamped.last() else {
        return 0.0;
    };
    let delta = last.signed_duration_since(first);
    let seconds = delta.num_milliseconds() as f64 / 1000.0;
    if seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Axis ranges for the elevation profile chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileAxes {
    pub min_elevation_m: f64,
    pub max_elevation_m: f64,
    pub elevation_grid_m: f64,
    pub max_distance_km: f64,
    pub distance_tick_km: f64,
}

const DISTANCE_TICKS_KM: [f64; 12] = [
    0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0,
];
const ELEVATION_TICKS_M: [f64; 10] = [1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0];

fn nearest_tick(candidates: &[f64], ideal: f64) -> f64 {
    // Ties resolve to the smaller candidate, the first one in the list.
    candidates
        .iter()
        .copied()
        .fold(None, |best: Option<f64>, c| match best {
            Some(b) if (b - ideal).abs() <= (c - ideal).abs() => Some(b),
            _ => Some(c),
        })
        .unwrap_or(ideal)
}

impl ProfileAxes {
    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        let finite: Vec<f64> = snapshot
            .elevations_m
            .iter()
            .copied()
            .filter(|e| e.is_finite())
            .collect();

        let (min_elevation_m, max_elevation_m) = match (
            finite.iter().copied().reduce(f64::min),
            finite.iter().copied().reduce(f64::max),
        ) {
            (Some(lo), Some(hi)) => {
                let range = hi - lo;
                let padding = if range > 10.0 { range * 0.1 } else { 5.0 };
                (
                    ((lo - padding) / 10.0).floor() * 10.0,
                    ((hi + padding) / 10.0).ceil() * 10.0,
                )
            }
            _ => (0.0, 100.0),
        };

        let elevation_grid_m = if finite.is_empty() {
            10.0
        } else {
            let range = max_elevation_m - min_elevation_m;
            if range > 0.0 {
                nearest_tick(&ELEVATION_TICKS_M, range / 5.0).max(1.0)
            } else {
                10.0
            }
        };

        let total_km = snapshot.cumulative_distance_km.last().copied().unwrap_or(0.0);
        let (distance_tick_km, max_distance_km) = if total_km > 0.0 {
            let tick = nearest_tick(&DISTANCE_TICKS_KM, total_km / 6.0).max(0.1);
            (tick, (total_km / tick).ceil() * tick)
        } else {
            (1.0, 1.0)
        };

        ProfileAxes {
            min_elevation_m,
            max_elevation_m,
            elevation_grid_m,
            max_distance_km: if max_distance_km > 0.0 { max_distance_km } else { 1.0 },
            distance_tick_km,
        }
    }
}
