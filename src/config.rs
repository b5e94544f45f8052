//! Configuration for the EMG gesture agent.
//!
//! All time values are milliseconds on disk and [`Duration`] in memory.
//! Amplitudes are unit-less, in whatever scale the smoothed headset
//! signal arrives in.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for the agent.
///
/// Missing sections fall back to their defaults when loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classification thresholds and gesture timing
    pub detector: DetectorConfig,

    /// Raw sample smoothing and delivery
    pub source: SourceConfig,

    /// Where side effects go
    pub actions: ActionConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.detector.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit file, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("emg-gesture-agent")
            .join("config.json")
    }
}

/// An open amplitude interval: `min < value < max`.
///
/// Both ends are exclusive, so a sample sitting exactly on a boundary
/// belongs to neither neighbouring band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check whether a value lies strictly inside the band.
    pub fn contains(&self, value: f64) -> bool {
        value > self.min && value < self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(ConfigError::InvalidBand {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Thresholds and timing for the classifier, history and gesture detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Spacing between consecutive samples (ms)
    #[serde(rename = "sample_interval_ms", with = "duration_ms")]
    pub sample_interval: Duration,

    /// Number of events kept in the sliding history
    pub history_length: usize,

    /// Plausible signal range; anything outside is `None`
    pub signal_range: Band,

    pub reflex_blink: Band,
    pub voluntary_blink: Band,
    pub clench: Band,

    /// Two clenches must be further apart than this (ms)
    #[serde(rename = "double_clench_min_gap_ms", with = "duration_ms")]
    pub double_clench_min_gap: Duration,

    /// ...and closer together than this (ms)
    #[serde(rename = "double_clench_max_gap_ms", with = "duration_ms")]
    pub double_clench_max_gap: Duration,

    /// How long a double clench keeps plain clenches live (ms)
    #[serde(rename = "cooldown_ms", with = "duration_ms")]
    pub cooldown: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(50),
            history_length: 25,
            signal_range: Band::new(-200.0, 10.0),
            reflex_blink: Band::new(-10.0, 10.0),
            voluntary_blink: Band::new(-70.0, -10.0),
            clench: Band::new(-200.0, -70.0),
            double_clench_min_gap: Duration::from_millis(250),
            double_clench_max_gap: Duration::from_millis(700),
            cooldown: Duration::from_secs(8),
        }
    }
}

impl DetectorConfig {
    /// Reject configurations that would make the detector meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_length == 0 {
            return Err(ConfigError::InvalidHistoryLength);
        }
        if self.sample_interval.is_zero() {
            return Err(ConfigError::InvalidDuration("sample_interval"));
        }
        if self.cooldown.is_zero() {
            return Err(ConfigError::InvalidDuration("cooldown"));
        }

        self.signal_range.validate("signal_range")?;
        self.reflex_blink.validate("reflex_blink")?;
        self.voluntary_blink.validate("voluntary_blink")?;
        self.clench.validate("clench")?;

        if self.double_clench_min_gap >= self.double_clench_max_gap {
            return Err(ConfigError::InvalidGap {
                min: self.double_clench_min_gap,
                max: self.double_clench_max_gap,
            });
        }

        Ok(())
    }
}

/// Settings for turning the raw headset stream into per-tick samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Age of the exponentially weighted moving average (in readings)
    pub smoothing_age: u32,
    /// Treat an exactly-zero smoothed value as "no sample this tick"
    pub skip_zero: bool,
    /// Maximum number of raw readings buffered between reader and ticker
    pub channel_capacity: usize,
    /// Rate at which replayed readings are emitted (Hz, 0 = unpaced)
    pub replay_rate_hz: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            smoothing_age: 30,
            skip_zero: true,
            channel_capacity: 10_000,
            replay_rate_hz: 512,
        }
    }
}

/// Where triggered actions and notifications go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Directory holding the numbered action scripts
    pub script_dir: PathBuf,
    /// File name prefix of each script, followed by its index
    pub script_prefix: String,
    /// Whether desktop notifications are shown
    pub notifications: bool,
}

impl Default for ActionConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("emg-gesture-agent");

        Self {
            script_dir: data_dir.join("scripts"),
            script_prefix: "workspace_".to_string(),
            notifications: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidHistoryLength,
    InvalidDuration(&'static str),
    InvalidBand {
        name: &'static str,
        min: f64,
        max: f64,
    },
    InvalidGap {
        min: Duration,
        max: Duration,
    },
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidHistoryLength => write!(f, "history length must be at least 1"),
            ConfigError::InvalidDuration(name) => write!(f, "{name} must be non-zero"),
            ConfigError::InvalidBand { name, min, max } => {
                write!(f, "band {name} is empty or inverted ({min}..{max})")
            }
            ConfigError::InvalidGap { min, max } => write!(
                f,
                "double clench gap is empty ({}ms..{}ms)",
                min.as_millis(),
                max.as_millis()
            ),
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
