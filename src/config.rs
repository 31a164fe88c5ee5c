//! Core configuration, persisted as TOML under the user's config directory.
//!
//! Missing files fall back to defaults; a present but malformed file is an
//! error rather than being silently replaced.

use crate::gesture::AccumulatorPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};

const CONFIG_DIR: &str = "retroinput";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No config directory available on this platform")]
    NoConfigDir,

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub sample_rate: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 60.0,
            sample_rate: 30000.0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PointerConfig {
    /// Pixels per frame the D-pad moves the pointer.
    pub joypad_speed: u32,
    pub accumulator: AccumulatorPolicy,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            joypad_speed: 20,
            accumulator: AccumulatorPolicy::Clamped,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    pub frame_rate: u32,
    pub max_frames: Option<u64>,
    pub log_level: String,
    pub stats_interval_secs: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            max_frames: None,
            log_level: "info".to_string(),
            stats_interval_secs: 10,
        }
    }
}

impl ProbeConfig {
    pub fn level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)))
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    pub surface: SurfaceConfig,
    pub pointer: PointerConfig,
    pub probe: ProbeConfig,
}

impl CoreConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads from the default location, or defaults if there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                debug!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, self.to_toml_string()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the default config to the default location if nothing is there.
    pub fn ensure_default() -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        Self::ensure_default_at(&path)?;
        Ok(path)
    }

    pub fn ensure_default_at(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Ok(());
        }
        info!("Creating default configuration at {}", path.display());
        Self::default().save_to(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "surface must be non-empty, got {}x{}",
                self.surface.width, self.surface.height
            )));
        }
        if self.surface.fps.is_nan() || self.surface.fps <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fps must be positive, got {}",
                self.surface.fps
            )));
        }
        if self.pointer.joypad_speed == 0 {
            return Err(ConfigError::Invalid("joypad_speed must be non-zero".into()));
        }
        if self.probe.frame_rate == 0 {
            return Err(ConfigError::Invalid("probe frame_rate must be non-zero".into()));
        }
        self.probe.level()?;
        Ok(())
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface.width as f32 / self.surface.height as f32
    }
}
