use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::frame::FrameGeometry;

/// Output rates outside this range fall back to [`DEFAULT_TARGET_RATE`]
pub const MIN_TARGET_RATE: f64 = 5.0;
pub const MAX_TARGET_RATE: f64 = 60.0;
pub const DEFAULT_TARGET_RATE: f64 = 20.0;

/// Recorder configuration, fixed for the lifetime of a recorder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Output frame rate of every clip (5-60, otherwise 20)
    pub target_rate: f64,

    /// Seconds recording continues after presence was last true
    pub hold_secs: f64,

    pub preroll: PreRollConfig,

    pub output: OutputConfig,

    /// Geometry of the frames the source delivers
    pub frame: FrameGeometry,

    pub time_zone: ZoneConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreRollConfig {
    pub enabled: bool,
    /// Seconds of footage retained before a trigger
    pub seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory clips are written into
    pub dir: PathBuf,
    /// File name prefix, followed by `_<yyyyMMdd_HHmmss>`
    pub prefix: String,
    pub container: Container,
}

/// Time-zone candidates, tried in order: `id`, `platform_default`,
/// `iana_default`, then the host zone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Explicit identifier (IANA or Windows-style name)
    pub id: Option<String>,
    /// Windows-style default, e.g. "Tokyo Standard Time"
    pub platform_default: Option<String>,
    /// IANA equivalent of the platform default, e.g. "Asia/Tokyo"
    pub iana_default: Option<String>,
}

/// Clip file container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// Headerless concatenated frame bytes
    Raw,
    /// YUV4MPEG2 stream
    Y4m,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Container::Raw => "raw",
            Container::Y4m => "y4m",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            target_rate: DEFAULT_TARGET_RATE,
            hold_secs: 3.0,
            preroll: PreRollConfig::default(),
            output: OutputConfig::default(),
            frame: FrameGeometry::default(),
            time_zone: ZoneConfig::default(),
        }
    }
}

impl Default for PreRollConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            seconds: 2.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("recordings"),
            prefix: "clip".to_string(),
            container: Container::Y4m,
        }
    }
}

impl RecorderConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.output.dir = output_dir.into();
        config
    }

    /// Target rate after range normalization
    pub fn effective_rate(&self) -> f64 {
        normalize_rate(self.target_rate)
    }

    /// Hold window; negative or NaN values collapse to zero, oversized ones saturate
    pub fn hold(&self) -> Duration {
        if self.hold_secs.is_nan() || self.hold_secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.hold_secs).unwrap_or(Duration::MAX)
    }

    /// Number of frames the pre-roll buffer retains (0 when disabled)
    pub fn preroll_capacity(&self) -> usize {
        if !self.preroll.enabled {
            return 0;
        }

        let frames = (self.effective_rate() * self.preroll.seconds).round();
        if frames.is_finite() && frames > 0.0 {
            frames as usize
        } else {
            0
        }
    }
}

pub fn normalize_rate(rate: f64) -> f64 {
    if rate.is_finite() && (MIN_TARGET_RATE..=MAX_TARGET_RATE).contains(&rate) {
        rate
    } else {
        DEFAULT_TARGET_RATE
    }
}
