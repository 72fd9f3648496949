//! Error types for the track editor.
//!
//! Edits never fail hard: a request that cannot apply comes back as a
//! [`Rejection`] and leaves every piece of editor state untouched. File
//! and configuration problems are real errors and carry their source.

use std::path::PathBuf;
use thiserror::Error;

/// Why an edit request did not change anything.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The index does not address a point of the current track.
    #[error("Index out of range: {index} (length: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// The operation needs a highlighted point and none is set.
    #[error("No point is highlighted")]
    NoCursor,

    /// The requested range holds no points.
    #[error("Nothing to delete in the requested range")]
    EmptyRange,

    /// No points are checked for batch deletion.
    #[error("No points are checked")]
    EmptySelection,

    /// The undo stack is empty.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Another mutation is still in flight.
    #[error("Another edit is in progress")]
    Busy,
}

impl Rejection {
    /// Validation failures are routine UI races; `Busy` is re-entrance.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Rejection::Busy)
    }
}

/// Errors raised by the GPX track source and sink.
#[derive(Error, Debug)]
pub enum TrackIoError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse GPX from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: gpx::errors::GpxError,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize GPX to {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: gpx::errors::GpxError,
    },

    #[error("Timestamp out of range at point {index}")]
    Timestamp { index: usize },

    #[error("Failed to export profile: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised while loading the editor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
