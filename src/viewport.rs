//! Map framing for a track: center and slippy-map zoom level.

use crate::point::TrackPoint;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 18.0;
const SINGLE_POINT_ZOOM: f64 = 15.0;

/// Upper span bound in degrees and the zoom that still fits it.
const SPAN_ZOOM_TABLE: [(f64, f64); 14] = [
    (0.004, 17.0),
    (0.008, 16.0),
    (0.015, 15.0),
    (0.03, 14.0),
    (0.06, 13.0),
    (0.12, 12.0),
    (0.25, 11.0),
    (0.5, 10.0),
    (1.0, 9.0),
    (2.0, 8.0),
    (4.0, 7.0),
    (8.0, 6.0),
    (15.0, 5.0),
    (30.0, 4.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
}

/// Zoom level that fits a span of `span` degrees.
pub fn zoom_for_span(span: f64) -> f64 {
    if span == 0.0 {
        return MAX_ZOOM;
    }
    SPAN_ZOOM_TABLE
        .iter()
        .find(|(limit, _)| span < *limit)
        .map(|&(_, zoom)| zoom)
        .unwrap_or(3.0)
}

impl MapViewport {
    /// Frame the whole track with one zoom step of margin.
    ///
    /// Returns `None` for an empty track so the caller keeps its current view.
    pub fn fit(points: &[TrackPoint]) -> Option<Self> {
        let valid: Vec<&TrackPoint> = points.iter().filter(|p| p.has_valid_coordinates()).collect();
        match valid.as_slice() {
            [] => None,
            [p] => Some(MapViewport {
                center_lat: p.lat,
                center_lon: p.lon,
                zoom: SINGLE_POINT_ZOOM,
            }),
            many => {
                let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
                let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
                for p in many {
                    min_lat = min_lat.min(p.lat);
                    max_lat = max_lat.max(p.lat);
                    min_lon = min_lon.min(p.lon);
                    max_lon = max_lon.max(p.lon);
                }
                let base = zoom_for_span(max_lat - min_lat).min(zoom_for_span(max_lon - min_lon));
                Some(MapViewport {
                    center_lat: (min_lat + max_lat) / 2.0,
                    center_lon: (min_lon + max_lon) / 2.0,
                    zoom: (base - 1.0).max(MIN_ZOOM),
                })
            }
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom + 1.0)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom - 1.0)
    }

    /// Returns false when already at the limit.
    fn set_zoom(&mut self, zoom: f64) -> bool {
        let clamped = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if clamped == self.zoom {
            return false;
        }
        self.zoom = clamped;
        true
    }
}
