use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::predict::Location;
use crate::tle::{SpaceTrackCredentials, TleSource};

const CONFIG_FILE_NAME: &str = "satpass.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Config file not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub station: Option<StationConfig>,
    #[serde(default)]
    pub predict: PredictConfig,
    pub spacetrack: Option<SpaceTrackCredentials>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

impl StationConfig {
    pub fn location(&self) -> Option<Location> {
        Location::from_coordinates(&self.coordinates, Some(self.altitude_m))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictConfig {
    #[serde(default)]
    pub min_elevation_deg: f64,
    #[serde(default)]
    pub default_source: TleSource,
    pub tle_folder: Option<PathBuf>,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            min_elevation_deg: 0.0,
            default_source: TleSource::Amsat,
            tle_folder: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load an explicit path, or the first `satpass.yaml` found in the
    /// working directory or `$HOME/.config`. Defaults when none exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            return Self::from_file(path);
        }

        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(home) = std::env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join(".config").join(CONFIG_FILE_NAME));
        }

        match candidates.into_iter().find(|p| p.is_file()) {
            Some(path) => {
                log::debug!("Using config file {}", path.display());
                Self::from_file(&path)
            }
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = Config::from_str(
            r#"
station:
  name: Rooftop
  coordinates: "40.7128, -74.0060"
  altitude_m: 10
predict:
  min_elevation_deg: 5.0
  default_source: celestrak
  tle_folder: ./tles
spacetrack:
  username: user@example.com
  password: hunter2
"#,
        )
        .unwrap();

        let location = config.station.as_ref().unwrap().location().unwrap();
        assert_eq!(location.latitude_deg, 40.7128);
        assert_eq!(location.altitude_m, 10.0);
        assert_eq!(config.predict.min_elevation_deg, 5.0);
        assert_eq!(config.predict.default_source, TleSource::Celestrak);
        assert_eq!(config.predict.tle_folder, Some(PathBuf::from("./tles")));
        assert_eq!(config.spacetrack.unwrap().username, "user@example.com");
    }

    #[test]
    fn empty_sections_fall_back_to_defaults() {
        let config = Config::from_str("spacetrack:\n  username: a\n  password: b\n").unwrap();
        assert!(config.station.is_none());
        assert_eq!(config.predict.default_source, TleSource::Amsat);
        assert_eq!(config.predict.min_elevation_deg, 0.0);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::discover(Some(Path::new("/nonexistent/satpass.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn invalid_yaml_is_reported() {
        assert!(matches!(
            Config::from_str("predict: [unclosed"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
