use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FILENAME: &str = "config.yaml";
pub const APP_DIR: &str = "qadeck";
const STATE_DIR: &str = "state";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Where per-deck progress is stored. Defaults to the user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presenter: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windowed: Option<bool>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `qadeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# qadeck configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn theme(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.theme.as_deref())
    }

    pub fn presenter(&self) -> bool {
        self.defaults
            .as_ref()
            .and_then(|d| d.presenter)
            .unwrap_or(false)
    }

    pub fn windowed(&self) -> bool {
        self.defaults
            .as_ref()
            .and_then(|d| d.windowed)
            .unwrap_or(false)
    }

    /// Root directory for persisted deck progress.
    pub fn state_root(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.state_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR).join(STATE_DIR))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.presenter" => {
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .presenter = Some(parse_bool(key, value)?);
            }
            "defaults.windowed" => {
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .windowed = Some(parse_bool(key, value)?);
            }
            "state_dir" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Invalid state_dir: must not be empty.");
                }
                self.state_dir = Some(PathBuf::from(value));
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.presenter, defaults.windowed, state_dir"
            ),
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid value for {key}: {value}. Must be 'true' or 'false'."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_theme() {
        let mut config = Config::default();
        config.set("defaults.theme", "dark").unwrap();
        assert_eq!(config.theme(), Some("dark"));
        assert!(config.set("defaults.theme", "neon").is_err());
        assert_eq!(config.theme(), Some("dark"));
    }

    #[test]
    fn test_set_booleans() {
        let mut config = Config::default();
        assert!(!config.presenter());
        config.set("defaults.presenter", "true").unwrap();
        config.set("defaults.windowed", "yes").unwrap();
        assert!(config.presenter());
        assert!(config.windowed());

        let err = config.set("defaults.presenter", "maybe").unwrap_err();
        assert!(err.to_string().contains("defaults.presenter"));
    }

    #[test]
    fn test_unknown_key() {
        let mut config = Config::default();
        let err = config.set("defaults.transition", "fade").unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
    }

    #[test]
    fn test_state_root_override() {
        let mut config = Config::default();
        config.set("state_dir", "/tmp/qadeck-progress").unwrap();
        assert_eq!(
            config.state_root().unwrap(),
            PathBuf::from("/tmp/qadeck-progress")
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILENAME);

        let mut config = Config::default();
        config.set("defaults.theme", "dark").unwrap();
        config.set("defaults.presenter", "true").unwrap();
        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# qadeck configuration"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.theme(), Some("dark"));
        assert!(loaded.presenter());
        assert!(!loaded.windowed());
        assert!(loaded.state_dir.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join(FILENAME)).unwrap_err();
        assert!(err.to_string().contains("No config found"));
    }
}
