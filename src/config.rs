// Decider Configuration
//
// Storage location, place-search defaults, external call timeouts and the
// selection mode used by the place session.

use crate::selection::SelectionMode;
use crate::types::Coordinate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Data directory name under the platform's local data dir
const DATA_DIR_NAME: &str = "decider";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeciderConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub places: PlacesConfig,
}

/// Where persisted blobs live
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the platform data directory when set
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the effective data directory
    pub fn resolve_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DATA_DIR_NAME),
        }
    }
}

/// Place search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    /// Origin used when the location provider has no fix
    pub default_origin: Coordinate,

    /// Initial distance ceiling in meters (also the search radius)
    pub default_max_distance: f64,

    /// Initial rating floor
    pub default_min_rating: f64,

    /// Time budget for a place search (in seconds)
    #[serde(with = "serde_duration")]
    pub search_timeout: Duration,

    /// Time budget for a place detail lookup (in seconds)
    #[serde(with = "serde_duration")]
    pub detail_timeout: Duration,

    pub selection_mode: SelectionMode,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            default_origin: Coordinate::new(43.6532, -79.3832), // Toronto
            default_max_distance: 5000.0,
            default_min_rating: 0.0,
            search_timeout: Duration::from_secs(10),
            detail_timeout: Duration::from_secs(10),
            selection_mode: SelectionMode::Uniform,
        }
    }
}

// Duration as whole seconds
mod serde_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl DeciderConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: DeciderConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let places = &self.places;

        if !(0.0..=5.0).contains(&places.default_min_rating) {
            return Err(ConfigError::ValidationError(
                "places.default_min_rating must be between 0 and 5".to_string(),
            ));
        }

        if !places.default_max_distance.is_finite() || places.default_max_distance <= 0.0 {
            return Err(ConfigError::ValidationError(
                "places.default_max_distance must be a positive number of meters".to_string(),
            ));
        }

        if places.search_timeout.is_zero() || places.detail_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "places timeouts must be at least 1 second".to_string(),
            ));
        }

        let origin = places.default_origin;
        if !(-90.0..=90.0).contains(&origin.lat) || !(-180.0..=180.0).contains(&origin.lng) {
            return Err(ConfigError::ValidationError(format!(
                "places.default_origin out of range: {}, {}",
                origin.lat, origin.lng
            )));
        }

        Ok(())
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}
