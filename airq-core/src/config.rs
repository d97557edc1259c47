use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{geocode, provider::open_meteo};

/// Upstream endpoints and HTTP behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub geocoding_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: open_meteo::DEFAULT_BASE_URL.to_string(),
            geocoding_url: geocode::DEFAULT_GEOCODING_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Raw map credentials as stored on disk. Validate with [`Config::map_config`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    pub api_key: Option<String>,
    pub map_id: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [provider]
/// base_url = "https://air-quality-api.open-meteo.com"
/// timeout_secs = 30
///
/// [map]
/// api_key = "..."
/// map_id = "..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub map: MapSettings,
}

/// Map credentials after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapConfig {
    Ready { api_key: String, map_id: String },
    Missing { reasons: Vec<String> },
}

impl MapConfig {
    pub fn is_ready(&self) -> bool {
        matches!(self, MapConfig::Ready { .. })
    }
}

impl Config {
    /// Validate map credentials. Blank values count as missing.
    pub fn map_config(&self) -> MapConfig {
        let api_key = non_blank(self.map.api_key.as_deref());
        let map_id = non_blank(self.map.map_id.as_deref());

        let mut reasons = Vec::new();
        if api_key.is_none() {
            reasons.push("Map API key (map.api_key) is missing.".to_string());
        }
        if map_id.is_none() {
            reasons.push("Map ID (map.map_id) is missing.".to_string());
        }

        match (api_key, map_id) {
            (Some(api_key), Some(map_id)) => MapConfig::Ready {
                api_key: api_key.to_string(),
                map_id: map_id.to_string(),
            },
            _ => MapConfig::Missing { reasons },
        }
    }

    /// Store map credentials, dropping blank input.
    pub fn set_map_credentials(&mut self, api_key: &str, map_id: &str) {
        self.map.api_key = non_blank(Some(api_key)).map(str::to_string);
        self.map.map_id = non_blank(Some(map_id)).map(str::to_string);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "airq", "airq")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_missing_map_credentials() {
        let cfg = Config::default();

        match cfg.map_config() {
            MapConfig::Missing { reasons } => {
                assert_eq!(reasons.len(), 2);
                assert!(reasons[0].contains("API key"));
                assert!(reasons[1].contains("Map ID"));
            }
            other => panic!("expected missing map config, got {other:?}"),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut cfg = Config::default();
        cfg.set_map_credentials("KEY", "   ");

        assert_eq!(cfg.map.map_id, None);
        assert_eq!(
            cfg.map_config(),
            MapConfig::Missing { reasons: vec!["Map ID (map.map_id) is missing.".to_string()] }
        );
    }

    #[test]
    fn both_credentials_make_map_ready() {
        let mut cfg = Config::default();
        cfg.set_map_credentials(" KEY ", "MAP");

        assert_eq!(
            cfg.map_config(),
            MapConfig::Ready { api_key: "KEY".into(), map_id: "MAP".into() }
        );
        assert!(cfg.map_config().is_ready());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.provider.timeout_secs, 30);
        assert_eq!(cfg.provider.base_url, "https://air-quality-api.open-meteo.com");
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_map_credentials("KEY", "MAP");
        cfg.provider.timeout_secs = 5;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[provider]\ntimeout_secs = 10\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.provider.timeout_secs, 10);
        assert_eq!(cfg.provider.base_url, open_meteo::DEFAULT_BASE_URL);
        assert!(!cfg.map_config().is_ready());
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "provider = 3").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
