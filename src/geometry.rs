//! Geometry helpers shared by the stats engine and the map viewport.
use geo::HaversineDistance;

use crate::point::TrackPoint;

/// Surface distance in meters between two points, ignoring elevation.
pub fn distance_2d(a: &TrackPoint, b: &TrackPoint) -> f64 {
    a.geo_point().haversine_distance(&b.geo_point())
}

/// Centered moving average over `window` samples.
///
/// The convolution pads with zeros at both ends, then the first and last
/// `window / 2` outputs are replaced by the raw samples so the ends of the
/// profile are not dragged towards zero. Windows below 3, or tracks shorter
/// than the window, are returned untouched.
pub fn smooth_elevations(elevations: &[f64], window: usize) -> Vec<f64> {
    if window < 3 || elevations.len() < window {
        return elevations.to_vec();
    }

    let n = elevations.len() as isize;
    let m = window as isize;
    // Same alignment as a "same"-mode convolution: output i is centered on
    // full-convolution index i + (m - 1) / 2.
    let offset = (m - 1) / 2;

    let mut smoothed: Vec<f64> = (0..n)
        .map(|i| {
            let hi = i + offset;
            let lo = hi - (m - 1);
            let sum: f64 = (lo.max(0)..=hi.min(n - 1))
                .map(|k| elevations[k as usize])
                .sum();
            sum / window as f64
        })
        .collect();

    let half = window / 2;
    let len = elevations.len();
    smoothed[..half].copy_from_slice(&elevations[..half]);
    smoothed[len - half..].copy_from_slice(&elevations[len - half..]);

    smoothed
}
