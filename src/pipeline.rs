//! Wholesale stats recompute after each track mutation.

use std::sync::Arc;

use tracing::debug;

use crate::point::TrackPoint;
use crate::stats::{compute_stats, StatsParams, StatsSnapshot};

#[derive(Debug, Default)]
pub struct StatsPipeline {
    params: StatsParams,
    latest: Arc<StatsSnapshot>,
    recomputes: u64,
}

impl StatsPipeline {
    pub fn new(params: StatsParams) -> Self {
        StatsPipeline {
            params,
            latest: Arc::new(StatsSnapshot::default()),
            recomputes: 0,
        }
    }

    /// Recompute from the post-mutation track and keep the result as the latest snapshot.
    pub fn on_track_changed(&mut self, track: &[TrackPoint]) -> Arc<StatsSnapshot> {
        let snapshot = Arc::new(compute_stats(track, &self.params));
        self.recomputes += 1;
        debug!(
            "Stats recomputed for {} points: {:.2} km, {:.1} m ascent",
            track.len(),
            snapshot.total_distance_km,
            snapshot.total_ascent_m
        );
        self.latest = Arc::clone(&snapshot);
        snapshot
    }

    pub fn latest(&self) -> Arc<StatsSnapshot> {
        Arc::clone(&self.latest)
    }

    /// Number of recomputes since construction.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}
