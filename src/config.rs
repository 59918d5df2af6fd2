use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::predict::{GroundStation, DEFAULT_HORIZON_MINUTES, MAX_HORIZON_MINUTES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid station coordinates: {0}")]
    InvalidCoordinates(String),
    #[error("invalid horizon {0:?}: {1}")]
    InvalidHorizon(String, String),
    #[error("empty at_command")]
    EmptyAtCommand,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default = "default_horizon")]
    pub horizon: String,
    #[serde(default = "default_at_command")]
    pub at_command: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub tle_file: PathBuf,
    pub satellite: String,
    pub pass_script: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            station: StationConfig::default(),
            defaults: DefaultsConfig::default(),
            horizon: default_horizon(),
            at_command: default_at_command(),
        }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: Some("Melbourne".to_string()),
            coordinates: "37.8136 S, 144.9631 E".to_string(),
            altitude_m: 0.0,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            tle_file: PathBuf::from("tle.txt"),
            satellite: "ACRUX-1".to_string(),
            pass_script: "python3 pass.py".to_string(),
        }
    }
}

fn default_horizon() -> String {
    format!("{}m", DEFAULT_HORIZON_MINUTES)
}

fn default_at_command() -> String {
    "at".to_string()
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.ground_station()?;
        config.horizon_minutes()?;
        if config.at_command.trim().is_empty() {
            return Err(ConfigError::EmptyAtCommand);
        }
        Ok(config)
    }

    pub fn ground_station(&self) -> Result<GroundStation, ConfigError> {
        GroundStation::from_coordinates(&self.station.coordinates, Some(self.station.altitude_m))
            .ok_or_else(|| ConfigError::InvalidCoordinates(self.station.coordinates.clone()))
    }

    /// Sampling horizon in whole minutes, between one minute and
    /// `MAX_HORIZON_MINUTES`
    pub fn horizon_minutes(&self) -> Result<u32, ConfigError> {
        let invalid = |msg: String| ConfigError::InvalidHorizon(self.horizon.clone(), msg);
        let duration = humantime::parse_duration(self.horizon.trim())
            .map_err(|e| invalid(e.to_string()))?;
        if duration.as_nanos() % 60_000_000_000 != 0 {
            return Err(invalid("not a whole number of minutes".into()));
        }
        let minutes = duration.as_secs() / 60;
        if minutes == 0 {
            return Err(invalid("shorter than one minute".into()));
        }
        if minutes > u64::from(MAX_HORIZON_MINUTES) {
            return Err(invalid(format!(
                "longer than {} minutes",
                MAX_HORIZON_MINUTES
            )));
        }
        u32::try_from(minutes).map_err(|e| invalid(e.to_string()))
    }

    pub fn station_name(&self) -> &str {
        self.station.name.as_deref().unwrap_or("ground station")
    }
}
