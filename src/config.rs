use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;

/// Narrowest field that still fits the border, crosshair range and a target
pub const MIN_FIELD_WIDTH: u16 = 5;

/// Tuning values for the trainer. Missing keys in a stored file fall back
/// to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub field_width: u16,
    pub acceleration_rate: f64,
    pub deceleration_factor: f64,
    pub max_velocity: f64,
    pub standstill_threshold: f64,
    pub release_timeout_ms: u64,
    pub counter_strafe_window_ms: u64,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field_width: 80,
            acceleration_rate: 1.0,
            deceleration_factor: 0.75,
            max_velocity: 1.0,
            standstill_threshold: 0.15,
            release_timeout_ms: 80,
            counter_strafe_window_ms: 100,
            tick_rate_ms: 35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("field width must be at least 5 columns, got {0}")]
    FieldTooNarrow(u16),

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("deceleration factor must be between 0 and 1 (exclusive), got {0}")]
    DecelerationOutOfRange(f64),

    #[error("standstill threshold must not be negative, got {0}")]
    NegativeThreshold(f64),

    #[error("tick rate must be at least 1ms")]
    ZeroTickRate,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field_width < MIN_FIELD_WIDTH {
            return Err(ConfigError::FieldTooNarrow(self.field_width));
        }
        // negated comparisons also reject NaN
        if !(self.acceleration_rate > 0.0) {
            return Err(ConfigError::NotPositive {
                name: "acceleration rate",
                value: self.acceleration_rate,
            });
        }
        if !(self.max_velocity > 0.0) {
            return Err(ConfigError::NotPositive {
                name: "max velocity",
                value: self.max_velocity,
            });
        }
        if !(self.deceleration_factor > 0.0 && self.deceleration_factor < 1.0) {
            return Err(ConfigError::DecelerationOutOfRange(
                self.deceleration_factor,
            ));
        }
        if !(self.standstill_threshold >= 0.0) {
            return Err(ConfigError::NegativeThreshold(self.standstill_threshold));
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        Ok(())
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Config::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read config, using defaults");
                return Config::default();
            }
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "malformed config, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
