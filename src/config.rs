//! Editor configuration, read from an optional TOML file.
//!
//! ```toml
//! smoothing_window = 5
//! ascent_threshold_m = 0.3
//! display_utc_offset_minutes = 540
//! default_track_name = "GPX Track"
//! ```
//!
//! Missing keys keep their defaults.

use std::fs;
use std::path::Path;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gpx_io::DEFAULT_TRACK_NAME;
use crate::stats::StatsParams;

const MAX_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Moving-average window for ascent; values below 3 disable smoothing.
    pub smoothing_window: usize,
    pub ascent_threshold_m: f64,
    /// Offset that timestamps are displayed and edited in.
    pub display_utc_offset_minutes: i32,
    pub default_track_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            smoothing_window: 5,
            ascent_threshold_m: 0.3,
            display_utc_offset_minutes: 0,
            default_track_name: DEFAULT_TRACK_NAME.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EditorConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smoothing_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "smoothing_window",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.ascent_threshold_m.is_finite() || self.ascent_threshold_m < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "ascent_threshold_m",
                reason: format!("must be a non-negative number, got {}", self.ascent_threshold_m),
            });
        }
        if self.display_utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::InvalidValue {
                field: "display_utc_offset_minutes",
                reason: format!("must be within ±{} minutes", MAX_OFFSET_MINUTES),
            });
        }
        Ok(())
    }

    pub fn stats_params(&self) -> StatsParams {
        StatsParams {
            smoothing_window: self.smoothing_window,
            ascent_threshold_m: self.ascent_threshold_m,
        }
    }

    pub fn display_offset(&self) -> FixedOffset {
        // Out-of-range offsets are rejected by validate(); fall back to UTC.
        FixedOffset::east_opt(self.display_utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}
