use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BACKGROUND: &str = "assets/shirt.png";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// T-shirt image drawn behind the logo. Defaults to [`DEFAULT_BACKGROUND`].
    pub background_path: Option<PathBuf>,
    /// Where exports land. Defaults to the user's download folder.
    pub output_dir: Option<PathBuf>,
}

impl DesignerConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("TShirtDesigner")
            .join("config.json")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Loads the config at `path`, writing the defaults there on first run.
    /// Anything unreadable falls back to the defaults.
    pub fn load_or_init(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {:?}, writing defaults", path);
            let config = Self::default();
            if let Err(e) = config.save(path) {
                log::warn!("Failed to save default config: {}", e);
            }
            return config;
        }

        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Failed to load config from {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn background_path(&self) -> PathBuf {
        self.background_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKGROUND))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = DesignerConfig::load_or_init(&path);
        assert_eq!(config, DesignerConfig::default());
        assert!(path.exists());
        assert_eq!(DesignerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = DesignerConfig {
            background_path: Some(PathBuf::from("/tmp/shirt.png")),
            output_dir: Some(PathBuf::from("/tmp/out")),
        };
        config.save(&path).unwrap();

        let loaded = DesignerConfig::load_or_init(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.output_dir(), PathBuf::from("/tmp/out"));
        assert_eq!(loaded.background_path(), PathBuf::from("/tmp/shirt.png"));
    }

    #[test]
    fn test_partial_and_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, r#"{ "output_dir": "/srv/designs" }"#).unwrap();
        let partial = DesignerConfig::load_or_init(&path);
        assert_eq!(partial.output_dir, Some(PathBuf::from("/srv/designs")));
        assert_eq!(partial.background_path(), PathBuf::from(DEFAULT_BACKGROUND));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(DesignerConfig::load(&path), Err(ConfigError::JsonError(_))));
        assert_eq!(DesignerConfig::load_or_init(&path), DesignerConfig::default());
    }
}
