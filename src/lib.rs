//! Editing core for GPS tracks: deletions with multi-level undo, point
//! selection, and track statistics recomputed after every structural edit.

pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod gate;
pub mod geometry;
pub mod gpx_io;
pub mod orchestrator;
pub mod pipeline;
pub mod point;
pub mod stats;
pub mod track_store;
pub mod viewport;

pub use config::EditorConfig;
pub use error::{ConfigError, Rejection, TrackIoError};
pub use events::{EditKind, EditorEvent, EventCategory, EventFilter, SubscriptionId};
pub use orchestrator::{EditOrchestrator, EditOutcome, UserIntent};
pub use point::TrackPoint;
pub use stats::{compute_stats, ProfileAxes, StatsParams, StatsSnapshot};
pub use track_store::{ControlStates, DeletionRecord, TrackStore};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` narrows or widens the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
